//! Cache key builders.

use uuid::Uuid;

/// Prefix applied to all Khozo cache keys.
const PREFIX: &str = "khozo";

/// Ranked related-content list for a source item.
///
/// `include_types` is order-insensitive; `None` and an empty list both mean
/// "all types".
pub fn related(item_id: Uuid, min_similarity: f64, include_types: Option<&[&str]>) -> String {
    let types = match include_types {
        Some(types) if !types.is_empty() => {
            let mut sorted: Vec<&str> = types.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.join(",")
        }
        _ => "all".to_string(),
    };
    format!("{PREFIX}:related:{item_id}:{min_similarity:.3}:{types}")
}

/// Trending list of one user's catalogue for a window and limit.
pub fn trending(user_id: Uuid, window: &str, limit: u32) -> String {
    format!("{PREFIX}:trending:{user_id}:{window}:{limit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_key_ignores_type_order() {
        let id = Uuid::nil();
        assert_eq!(
            related(id, 0.3, Some(&["scheme", "application"])),
            related(id, 0.3, Some(&["application", "scheme"]))
        );
        assert_eq!(
            related(id, 0.3, None),
            "khozo:related:00000000-0000-0000-0000-000000000000:0.300:all"
        );
        assert_ne!(related(id, 0.3, None), related(id, 0.5, None));
    }

    #[test]
    fn test_trending_key() {
        let user = Uuid::nil();
        assert_eq!(
            trending(user, "week", 10),
            "khozo:trending:00000000-0000-0000-0000-000000000000:week:10"
        );
        assert_ne!(trending(user, "week", 10), trending(Uuid::new_v4(), "week", 10));
    }
}
