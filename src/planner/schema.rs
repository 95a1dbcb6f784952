//! Response schema sent with every request so the model answers with a plan.

use serde_json::{Value, json};

fn exercise() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique identifier for the exercise, e.g., 'push-up-1'." },
            "name": { "type": "STRING", "description": "Name of the exercise, e.g., 'Incline Push-ups'." },
            "sets": { "type": "INTEGER", "description": "Number of sets." },
            "reps": { "type": "INTEGER", "description": "Number of repetitions per set. Use only if not a timed exercise." },
            "duration": { "type": "INTEGER", "description": "Duration in seconds for timed exercises like planks. Use only if not a rep-based exercise." },
            "rest": { "type": "INTEGER", "description": "Rest time in seconds between sets." }
        },
        "required": ["id", "name", "sets", "rest"]
    })
}

fn day() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique identifier for the workout day, e.g., 'week1-day1'." },
            "day": { "type": "INTEGER", "description": "The day number within the week (1, 2, 3, etc.)." },
            "name": { "type": "STRING", "description": "A descriptive name for the workout, e.g., 'Full Body A'." },
            "exercises": { "type": "ARRAY", "items": exercise() },
            "isCompleted": { "type": "BOOLEAN", "description": "Set to false by default." }
        },
        "required": ["id", "day", "name", "exercises", "isCompleted"]
    })
}

fn week() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique identifier for the week, e.g., 'week1'." },
            "week": { "type": "INTEGER", "description": "The week number (1-4)." },
            "description": { "type": "STRING", "description": "A brief description of the week's focus, e.g., 'Introduction/Baseline'." },
            "days": { "type": "ARRAY", "items": day() }
        },
        "required": ["id", "week", "description", "days"]
    })
}

/// Schema for a complete workout plan.
pub(super) fn workout_plan() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique ID for the entire plan, e.g., a timestamp." },
            "weeks": { "type": "ARRAY", "items": week() }
        },
        "required": ["id", "weeks"]
    })
}
