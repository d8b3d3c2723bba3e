//! The two pipeline stages: fetch one URL, pack one fetched body.

use crate::archive::Container;
use crate::fetch::Fetch;
use crate::url_model;

/// A fetched body waiting to be packed.
pub(super) struct Fetched<'a> {
    pub(super) index: usize,
    pub(super) url: &'a str,
    pub(super) body: Vec<u8>,
}

/// Fetch stage. On failure returns the message recorded on the task.
pub(super) fn fetch<'a>(
    fetcher: &dyn Fetch,
    index: usize,
    url: &'a str,
) -> Result<Fetched<'a>, String> {
    match fetcher.fetch(url) {
        Ok(body) => {
            tracing::debug!(url, bytes = body.len(), "fetched");
            Ok(Fetched { index, url, body })
        }
        Err(e) => {
            tracing::warn!(url, error = %e, timeout = e.is_timeout(), "fetch failed");
            Err(format!("download failed: {} ({})", url, e))
        }
    }
}

/// Pack stage: writes the body as member `file<index><ext>`.
pub(super) fn pack<C: Container>(writer: &mut C, item: &Fetched<'_>) -> Result<(), String> {
    let name = url_model::member_name(item.index, item.url);
    writer.add_member(&name, &item.body).map_err(|e| {
        tracing::warn!(url = item.url, member = %name, error = %e, "pack failed");
        format!("archive error: {} ({})", item.url, e)
    })
}
