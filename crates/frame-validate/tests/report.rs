//! Evaluation report serialization.

use polars::prelude::*;

use frame_model::ColumnKind;
use frame_validate::{ColumnSchema, FrameSchema, write_evaluation_json};

#[test]
fn report_round_trips_through_json() {
    let schema = FrameSchema::builder()
        .column("amount", ColumnSchema::of(ColumnKind::Int))
        .build()
        .expect("schema");
    let frame = df!(
        "amount" => [1i64, 2],
        "extra" => ["x", "y"],
    )
    .expect("frame");
    let outcome = schema.evaluate(&frame, "orders").expect("evaluation");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_evaluation_json(dir.path(), &outcome).expect("write report");
    assert_eq!(path.file_name().unwrap(), "evaluation_report.json");

    let contents = std::fs::read_to_string(&path).expect("read report");
    let json: serde_json::Value = serde_json::from_str(&contents).expect("parse report");
    assert_eq!(json["schema"], "frame-schema.evaluation-report");
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["name"], "orders");
    assert_eq!(json["valid"], true);
    assert_eq!(
        json["warning"]["remaining_columns"][0],
        serde_json::Value::String("extra".to_string())
    );
    // Column entries keep declaration order and carry their outcome tags.
    assert_eq!(json["evaluation"]["columns"][0]["name"], "amount");
    assert_eq!(
        json["evaluation"]["columns"][0]["evaluation"]["outcome"],
        "evaluated"
    );
    assert_eq!(
        json["evaluation"]["columns"][1]["evaluation"]["outcome"],
        "unhandled"
    );
}
