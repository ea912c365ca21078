use std::sync::Arc;

use outline_stream::prelude::*;
use outline_stream::sources::http::HttpOutlineSource;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StreamError> {
    let streamer = OutlineStreamer::builder()
        .source(Arc::new(HttpOutlineSource::from_env()?))
        .build()?;

    let document_id = std::env::args().nth(1).unwrap_or_else(|| "demo".into());
    let Some(mut stream) = streamer.stream(document_id.as_str()) else {
        eprintln!("outline for {document_id} is already streaming or finalized");
        return Ok(());
    };

    while let Some(update) = stream.next_update().await {
        match update {
            OutlineUpdate::Snapshot {
                items,
                active,
                high_water,
            } => {
                println!(
                    "{} items (active {active:?}, high-water {high_water})",
                    items.len()
                );
            }
            OutlineUpdate::Completed { items } => {
                println!("completed with {} items:", items.len());
                for item in &items {
                    println!("  - {}", item.content);
                }
            }
            OutlineUpdate::Failed { failure } => eprintln!("stream failed: {failure}"),
            OutlineUpdate::Cancelled => eprintln!("stream cancelled"),
        }
    }

    Ok(())
}
