//! Id parsing and batch partitioning.

use crate::error::{FetchError, FetchResult};

/// Max number of ids accepted by a single `statuses/lookup` call.
pub const MAX_LOOKUP_BATCH: usize = 100;

/// Split an ordered id list into batches of at most `max_batch` ids.
///
/// Order is preserved and batches never overlap; concatenating the
/// batches reproduces the input exactly. An empty input yields zero
/// batches, and no batch is ever empty.
#[must_use]
pub fn partition(ids: &[u64], max_batch: usize) -> Vec<Vec<u64>> {
    // chunks() panics on zero, and a zero-sized batch is meaningless.
    ids.chunks(max_batch.max(1))
        .map(<[u64]>::to_vec)
        .collect()
}

/// Parse id tokens into numeric ids, before any batching happens.
///
/// Blank tokens are skipped (a file of one id per line may have empty
/// lines); anything else that is not a decimal number is an input error
/// and aborts the run before any API quota is spent.
pub fn parse_ids<I, S>(tokens: I) -> FetchResult<Vec<u64>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() {
            continue;
        }
        let id = token.parse::<u64>().map_err(|_| FetchError::InvalidId {
            raw: token.to_string(),
        })?;
        ids.push(id);
    }
    Ok(ids)
}
