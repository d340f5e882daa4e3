use crate::types::ProbeTask;

/// Expand one candidate into probe tasks: the bare path plus one task per
/// configured extension. Extensioned and extensionless paths can exist
/// independently on real servers, so both are probed.
pub fn expand(base_url: &str, candidate: &str, extensions: &[String]) -> Vec<ProbeTask> {
    let base = base_url.trim_end_matches('/');
    let word = candidate.trim_matches('/');

    let mut tasks = Vec::with_capacity(extensions.len() + 1);
    tasks.push(ProbeTask {
        url: format!("{base}/{word}"),
        word: word.to_string(),
    });
    for ext in extensions {
        tasks.push(ProbeTask {
            url: format!("{base}/{word}.{ext}"),
            word: format!("{word}.{ext}"),
        });
    }
    tasks
}

/// Expand a whole candidate sequence in order.
pub fn expand_all(
    base_url: &str,
    candidates: impl IntoIterator<Item = String>,
    extensions: &[String],
) -> Vec<ProbeTask> {
    let mut tasks = Vec::new();
    for candidate in candidates {
        tasks.extend(expand(base_url, &candidate, extensions));
    }
    tasks
}
