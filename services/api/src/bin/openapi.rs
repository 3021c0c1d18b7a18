//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the goal tracker API (goals, user stats
//! and leaderboard routes) to disk, so clients can be generated without
//! starting the server or connecting to Postgres.
//!
//! Usage: `openapi [OUTPUT]`. The output path defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn write_api_doc(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let doc = ApiDoc::openapi();
    std::fs::write(path, doc.to_pretty_json()?)?;
    println!(
        "Wrote {} route(s) of the goal tracker API to {}",
        doc.paths.paths.len(),
        path
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    write_api_doc(&path)
}
