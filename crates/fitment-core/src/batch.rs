use std::thread;
use std::time::Duration;

use crate::config::ImportConfig;
use crate::error::Result;

// Rate-limited pipeline stage: bounded chunks, each awaited before the
// next, with a pause in between as backpressure against the backing
// store. Resolution reads never need this; bulk writes do.
pub fn process_in_batches<T, F>(items: &[T], config: &ImportConfig, mut apply: F) -> Result<usize>
where
    F: FnMut(&[T]) -> Result<()>,
{
    let batch_size = config.batch_size.max(1);
    let mut chunks = items.chunks(batch_size).peekable();
    while let Some(chunk) = chunks.next() {
        apply(chunk)?;
        if chunks.peek().is_some() && config.batch_pause_ms > 0 {
            thread::sleep(Duration::from_millis(config.batch_pause_ms));
        }
    }
    Ok(items.len())
}
