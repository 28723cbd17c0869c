//! Page walking for offset-paginated listings
//!
//! Pages are requested from 1 upwards until one comes back with fewer than
//! `per_page` records. This relies on the upstream never returning a short
//! page followed by a non-empty one, which holds for GitHub's offset
//! pagination.

use std::future::Future;

/// Fetch every page and flatten the records in order.
///
/// The first failing page aborts the whole fetch; pages already fetched
/// are dropped.
pub async fn fetch_all<T, E, F, Fut>(per_page: u32, mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let per_page = per_page.max(1) as usize;
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch_page(page).await?;
        let last = batch.len() < per_page;
        records.extend(batch);
        if last {
            return Ok(records);
        }
        page += 1;
    }
}
