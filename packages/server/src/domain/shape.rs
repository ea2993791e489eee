//! 図形モデルと `message` ペイロードの解釈
//!
//! `chat` / `deleted` メッセージの `message` フィールドは JSON 文字列の中に JSON を
//! 持つ二重エンコードになっている。このモジュールはその内側を型付きで解釈する。
//!
//! - 永続化される図形は [`Shape`]（rect / circle / pencil / arrow / text）
//! - 消しゴムのストロークは [`EraserStroke`] として別の型で表し、`Shape` には含めない

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::value_object::ShapeId;

/// キャンバス上の座標
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 永続化される図形
///
/// 検証するのは `type` と `shapeId` だけで、描画用のフィールドはクライアントごとに
/// 型が揺れるため（例: `fontSize` が `"16"` で届く）、解釈できない値は `None` になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect(Rectangle),
    Circle(Ellipse),
    Pencil(FreehandStroke),
    Arrow(Arrow),
    Text(TextLabel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fill_style: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub center_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub center_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub radius: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fill_style: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreehandStroke {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_points")]
    pub points: Vec<Point>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text_font_weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text_align: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text_stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

impl Shape {
    pub fn shape_id(&self) -> &ShapeId {
        match self {
            Shape::Rect(s) => &s.shape_id,
            Shape::Circle(s) => &s.shape_id,
            Shape::Pencil(s) => &s.shape_id,
            Shape::Arrow(s) => &s.shape_id,
            Shape::Text(s) => &s.shape_id,
        }
    }
}

/// 消しゴムのストローク
///
/// ヒットテスト専用の一時的な図形。削除対象の計算にだけ使われ、保存されることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraserStroke {
    pub shape_id: ShapeId,
    #[serde(default, deserialize_with = "lenient_points")]
    pub points: Vec<Point>,
}

impl EraserStroke {
    pub const TAG: &'static str = "eraser";
}

/// `message` ペイロードの解釈エラー
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("eraser stroke '{0}' is transient and cannot be persisted")]
    TransientShape(ShapeId),
}

#[derive(Deserialize)]
struct ShapeEnvelope {
    shape: Value,
}

#[derive(Deserialize)]
struct DeletedShapesEnvelope {
    #[serde(rename = "deletedShape")]
    deleted_shape: Vec<DeletedShapeRef>,
}

/// 削除対象の図形（`shapeId` 以外のフィールドは無視する）
#[derive(Deserialize)]
struct DeletedShapeRef {
    #[serde(rename = "shapeId")]
    shape_id: ShapeId,
}

/// `chat` メッセージの `message`（`{"shape": {...}}`）を解釈する
///
/// 消しゴムのストロークは [`PayloadError::TransientShape`] として拒否する。
pub fn parse_shape_message(raw: &str) -> Result<Shape, PayloadError> {
    let envelope: ShapeEnvelope = serde_json::from_str(raw)?;

    if envelope.shape.get("type").and_then(Value::as_str) == Some(EraserStroke::TAG) {
        let eraser: EraserStroke = serde_json::from_value(envelope.shape)?;
        return Err(PayloadError::TransientShape(eraser.shape_id));
    }

    Ok(serde_json::from_value(envelope.shape)?)
}

/// `deleted` メッセージの `message`（`{"deletedShape": [{"shapeId": ...}, ...]}`）から
/// 削除対象の図形 ID を取り出す
///
/// 重複した ID は最初の出現だけを残す。
pub fn parse_deleted_shapes(raw: &str) -> Result<Vec<ShapeId>, PayloadError> {
    let envelope: DeletedShapesEnvelope = serde_json::from_str(raw)?;

    let mut shape_ids: Vec<ShapeId> = Vec::with_capacity(envelope.deleted_shape.len());
    for deleted in envelope.deleted_shape {
        if !shape_ids.contains(&deleted.shape_id) {
            shape_ids.push(deleted.shape_id);
        }
    }

    Ok(shape_ids)
}

/// 保存済みの `message` から図形の `createdAt` を取り出す
pub fn created_at_millis_of(raw: &str) -> Option<i64> {
    let envelope: ShapeEnvelope = serde_json::from_str(raw).ok()?;
    match envelope.shape.get("createdAt")? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// 数値または数値文字列。それ以外は `None`
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// 文字列（数値と真偽値は文字列にする）。それ以外は `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// 点列。解釈できない点は読み飛ばす
fn lenient_points<'de, D>(deserializer: D) -> Result<Vec<Point>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        _ => Vec::new(),
    })
}
