//! Post-to-viewer visibility rules.
//!
//! Pure function of its inputs; evaluated in strict precedence:
//! public, then owner, then private, then friends-only against the
//! pre-fetched friend set. Unrecognized privacy values fail closed.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Post, PrivacyMode};

/// Decide whether `post` is visible to `viewer` (None = unauthenticated),
/// given the viewer's friend set.
pub fn is_visible(post: &Post, viewer: Option<Uuid>, viewer_friend_ids: &HashSet<Uuid>) -> bool {
    if post.privacy_mode == PrivacyMode::Public {
        return true;
    }
    if viewer == Some(post.user_id) {
        return true;
    }
    match post.privacy_mode {
        PrivacyMode::FriendsOnly => viewer_friend_ids.contains(&post.user_id),
        // Private to non-owners, and anything unrecognized
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(owner: Uuid, mode: PrivacyMode) -> Post {
        Post {
            user_id: owner,
            privacy_mode: mode,
            ..Post::default()
        }
    }

    #[test]
    fn public_posts_are_visible_to_everyone() {
        let owner = Uuid::new_v4();
        let p = post(owner, PrivacyMode::Public);
        assert!(is_visible(&p, Some(Uuid::new_v4()), &HashSet::new()));
        assert!(is_visible(&p, None, &HashSet::new()));
    }

    #[test]
    fn owner_sees_own_post_regardless_of_mode() {
        let owner = Uuid::new_v4();
        for mode in [
            PrivacyMode::Public,
            PrivacyMode::Private,
            PrivacyMode::FriendsOnly,
            PrivacyMode::Unknown,
        ] {
            assert!(is_visible(&post(owner, mode), Some(owner), &HashSet::new()));
        }
    }

    #[test]
    fn private_posts_hidden_from_everyone_else() {
        let owner = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let p = post(owner, PrivacyMode::Private);
        let friends = HashSet::from([owner]);
        // even a friend of the owner cannot see a private post
        assert!(!is_visible(&p, Some(friend), &friends));
        assert!(!is_visible(&p, None, &HashSet::new()));
    }

    #[test]
    fn friends_only_requires_owner_in_viewer_friend_set() {
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let p = post(owner, PrivacyMode::FriendsOnly);

        assert!(!is_visible(&p, Some(viewer), &HashSet::new()));
        assert!(is_visible(&p, Some(viewer), &HashSet::from([owner])));
        assert!(!is_visible(
            &p,
            Some(viewer),
            &HashSet::from([Uuid::new_v4()])
        ));
    }

    #[test]
    fn unknown_privacy_fails_closed() {
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let p = post(owner, PrivacyMode::Unknown);
        assert!(!is_visible(&p, Some(viewer), &HashSet::from([owner])));
        assert!(!is_visible(&p, None, &HashSet::new()));
    }
}
