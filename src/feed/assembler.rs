//! Turns a resolved post (or its placeholder) into the outward `FeedItem`.

use serde_json::json;

use crate::{
    feed::{
        identity_key::generate_key,
        metadata::PostMetadata,
        visibility::{DegradedReason, Resolution, UnavailablePlaceholder, UnavailableReason},
    },
    models::{
        feed::{FeedItem, FeedPost},
        user::{AuthorProfile, AuthorView, DEFAULT_AVATAR},
    },
};

/// Content shown in place of a post that can no longer be displayed.
pub const UNAVAILABLE_CONTENT: &str = "Este conteúdo não está mais disponível.";

/// Shown when the original author's account was deleted.
pub const REMOVED_AUTHOR_NAME: &str = "Usuário Removido";

/// Shown when nothing is known about the original author.
pub const UNKNOWN_AUTHOR_NAME: &str = "Autor Desconhecido";

/// Assembles a resolution. A visible post needs its author profile.
pub fn assemble(
    resolution: Resolution,
    author: Option<&AuthorProfile>,
    viewer_id: Option<i64>,
) -> Result<FeedItem, DegradedReason> {
    match resolution {
        Resolution::Visible(post) => {
            let author = author.ok_or(DegradedReason::AuthorMissing(post.author_id))?;
            Ok(assemble_post(post, author, viewer_id))
        }
        Resolution::Unavailable(placeholder) => Ok(assemble_placeholder(placeholder, viewer_id)),
    }
}

pub fn assemble_post(post: FeedPost, author: &AuthorProfile, viewer_id: Option<i64>) -> FeedItem {
    let metadata = PostMetadata::parse(&post.metadata);

    let author = if metadata.is_anonymous {
        AuthorView::anonymous()
    } else {
        real_author_view(author, post.avatar_url.as_deref())
    };

    let is_post_owner = viewer_id == Some(post.author_id);
    let is_share_owner = post
        .share
        .as_ref()
        .is_some_and(|share| viewer_id == Some(share.user_id));
    let is_attending = viewer_id.is_some_and(|viewer| {
        post.event_attendance
            .iter()
            .any(|record| record.user_id == viewer)
    });

    let unique_key = generate_key(post.id, post.share.as_ref().map(|s| s.key()).as_ref());

    FeedItem {
        unique_key,
        id: post.id,
        content: post.content,
        category_id: post.category_id,
        author,
        metadata: metadata.into_value(),
        images: post.images,
        created_at: post.created_at,
        likes_count: post.likes_count,
        is_liked: post.is_liked,
        comments_count: post.comments_count,
        comments: post.comments,
        is_post_owner,
        is_share_owner,
        shared_by: post.share,
        event_attendance: post.event_attendance,
        is_attending,
    }
}

pub fn assemble_placeholder(placeholder: UnavailablePlaceholder, viewer_id: Option<i64>) -> FeedItem {
    let reason = placeholder.reason;

    let author = match (reason, &placeholder.original_author) {
        (UnavailableReason::OriginalPostDeleted, Some(original)) => original.clone(),
        (UnavailableReason::OriginalAuthorDeleted, _) => AuthorView::generic(REMOVED_AUTHOR_NAME),
        (UnavailableReason::OriginalPostDeleted, None) => AuthorView::generic(UNKNOWN_AUTHOR_NAME),
    };

    let is_share_owner = placeholder
        .share
        .as_ref()
        .is_some_and(|share| viewer_id == Some(share.user_id));

    let created_at = placeholder
        .share
        .as_ref()
        .map_or_else(chrono::Utc::now, |share| share.shared_at);

    FeedItem {
        unique_key: placeholder.unique_key(),
        id: placeholder.id(),
        content: UNAVAILABLE_CONTENT.to_string(),
        category_id: 0,
        author,
        metadata: json!({
            "isUnavailable": true,
            "reason": reason.as_str(),
            "originalPostDeleted": reason == UnavailableReason::OriginalPostDeleted,
            "originalAuthorDeleted": reason == UnavailableReason::OriginalAuthorDeleted,
        }),
        images: Vec::new(),
        created_at,
        likes_count: 0,
        is_liked: false,
        comments_count: 0,
        comments: Vec::new(),
        is_post_owner: false,
        is_share_owner,
        shared_by: placeholder.share,
        event_attendance: Vec::new(),
        is_attending: false,
    }
}

/// The post-level avatar wins over the profile avatar.
fn real_author_view(author: &AuthorProfile, avatar_override: Option<&str>) -> AuthorView {
    let avatar_url = avatar_override
        .map(str::to_string)
        .or_else(|| author.avatar_url.clone())
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

    AuthorView {
        id: author.id,
        name: author.name.clone(),
        avatar_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feed::metadata::RawMetadata,
        models::{feed::EventAttendance, share::ShareEnvelope},
    };
    use chrono::{TimeZone, Utc};

    fn author() -> AuthorProfile {
        AuthorProfile {
            id: 7,
            name: "Ana".to_string(),
            avatar_url: Some("https://cdn.example/ana.png".to_string()),
        }
    }

    fn post(metadata: serde_json::Value) -> FeedPost {
        FeedPost {
            id: 50,
            author_id: 7,
            content: "hello".to_string(),
            category_id: 2,
            metadata: RawMetadata::from(metadata),
            images: vec!["https://cdn.example/1.png".to_string()],
            avatar_url: None,
            created_at: Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap(),
            likes_count: 4,
            is_liked: true,
            comments_count: 1,
            comments: Vec::new(),
            event_attendance: vec![EventAttendance {
                post_id: 50,
                user_id: 11,
                status: "going".to_string(),
            }],
            share: None,
        }
    }

    fn share(sharer: i64) -> ShareEnvelope {
        ShareEnvelope {
            id: 12,
            post_id: 50,
            user_id: sharer,
            name: "Bia".to_string(),
            avatar_url: DEFAULT_AVATAR.to_string(),
            message: None,
            shared_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn plain_post_uses_profile() {
        let item = assemble_post(post(json!({})), &author(), Some(7));

        assert_eq!(item.unique_key, "post:50");
        assert_eq!(item.author.id, 7);
        assert_eq!(item.author.avatar_url, "https://cdn.example/ana.png");
        assert!(item.is_post_owner);
        assert!(!item.is_share_owner);
        assert!(item.is_liked);
        assert_eq!(item.likes_count, 4);
    }

    #[test]
    fn avatar_override_wins() {
        let mut p = post(json!({}));
        p.avatar_url = Some("https://cdn.example/custom.png".to_string());

        let item = assemble_post(p, &author(), None);
        assert_eq!(item.author.avatar_url, "https://cdn.example/custom.png");
    }

    #[test]
    fn anonymous_share_scenario() {
        let mut p = post(json!({"isAnonymous": true}));
        p.share = Some(share(9));

        let item = assemble_post(p.clone(), &author(), Some(9));
        assert_eq!(item.unique_key, "shared:9:50:1704067200000");
        assert_eq!(item.author, AuthorView::anonymous());
        assert_eq!(item.author.name, "Usuário Anônimo");
        assert_eq!(item.author.avatar_url, "/default-avatar.png");
        assert!(item.is_share_owner);

        // Even the real author sees the substitute.
        let item = assemble_post(p, &author(), Some(7));
        assert_eq!(item.author.id, 0);
        assert!(item.is_post_owner);
        assert!(!item.is_share_owner);
    }

    #[test]
    fn sharing_own_post_sets_both_flags() {
        let mut p = post(json!({}));
        p.share = Some(share(7));

        let item = assemble_post(p, &author(), Some(7));
        assert!(item.is_post_owner);
        assert!(item.is_share_owner);
    }

    #[test]
    fn attendance_follows_viewer() {
        assert!(assemble_post(post(json!({})), &author(), Some(11)).is_attending);
        assert!(!assemble_post(post(json!({})), &author(), Some(12)).is_attending);
        assert!(!assemble_post(post(json!({})), &author(), None).is_attending);
    }

    #[test]
    fn visible_post_without_author_degrades() {
        let err = assemble(Resolution::Visible(post(json!({}))), None, None).unwrap_err();
        assert_eq!(err, DegradedReason::AuthorMissing(7));
    }

    #[test]
    fn placeholder_for_deleted_author() {
        let placeholder = UnavailablePlaceholder {
            post_id: 50,
            reason: UnavailableReason::OriginalAuthorDeleted,
            share: Some(share(9)),
            original_author: None,
        };

        let item = assemble_placeholder(placeholder, Some(9));
        assert_eq!(item.id, 12);
        assert_eq!(item.unique_key, "shared:9:50:1704067200000");
        assert_eq!(item.content, UNAVAILABLE_CONTENT);
        assert_eq!(item.category_id, 0);
        assert!(item.images.is_empty());
        assert_eq!(item.author.name, REMOVED_AUTHOR_NAME);
        assert_eq!(item.metadata["reason"], "ORIGINAL_AUTHOR_DELETED");
        assert_eq!(item.metadata["originalAuthorDeleted"], true);
        assert_eq!(item.metadata["originalPostDeleted"], false);
        assert!(!item.is_post_owner);
        assert!(item.is_share_owner);
    }

    #[test]
    fn placeholder_without_original_author() {
        let placeholder = UnavailablePlaceholder {
            post_id: 50,
            reason: UnavailableReason::OriginalPostDeleted,
            share: None,
            original_author: None,
        };

        let item = assemble_placeholder(placeholder, Some(7));
        assert_eq!(item.author.name, UNKNOWN_AUTHOR_NAME);
        assert_eq!(item.unique_key, "post:50");
        assert_eq!(item.id, 50);
        assert!(item.shared_by.is_none());
        assert!(!item.is_share_owner);
    }
}
