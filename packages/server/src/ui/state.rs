//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectSessionUseCase, CreateShapeUseCase, DeleteShapesUseCase, DisconnectSessionUseCase,
    GetShapeHistoryUseCase, RelayCursorUseCase, RoomMembershipUseCase,
};

/// ハンドラーから参照するユースケースの集合
pub struct AppState {
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    pub room_membership_usecase: Arc<RoomMembershipUseCase>,
    pub relay_cursor_usecase: Arc<RelayCursorUseCase>,
    pub create_shape_usecase: Arc<CreateShapeUseCase>,
    pub delete_shapes_usecase: Arc<DeleteShapesUseCase>,
    pub get_shape_history_usecase: Arc<GetShapeHistoryUseCase>,
}
