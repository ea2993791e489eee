//! UseCase layer
//!
//! ドメイン層の trait だけに依存し、接続・ルーム参加・図形の作成と削除・
//! カーソル中継・履歴取得の各操作を提供します。

mod broadcast_targets;
pub mod connect_session;
pub mod create_shape;
pub mod delete_shapes;
pub mod disconnect_session;
pub mod error;
pub mod get_shape_history;
pub mod relay_cursor;
pub mod room_membership;

pub use connect_session::ConnectSessionUseCase;
pub use create_shape::CreateShapeUseCase;
pub use delete_shapes::{DeleteShapesUseCase, DeletedShapes};
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{
    ConnectError, CreateShapeError, DeleteShapesError, DisconnectError, HistoryError,
    RoomMembershipError,
};
pub use get_shape_history::{DEFAULT_HISTORY_LIMIT, GetShapeHistoryUseCase};
pub use relay_cursor::RelayCursorUseCase;
pub use room_membership::RoomMembershipUseCase;
