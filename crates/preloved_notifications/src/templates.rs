// English copy for each notification kind.

use crate::dispatcher::NotificationEvent;

/// Shown when the actor has no display name.
pub const FALLBACK_ACTOR_NAME: &str = "Someone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCopy {
    pub title: String,
    pub body: String,
}

pub fn render(event: &NotificationEvent) -> RenderedCopy {
    let (title, body) = match event {
        NotificationEvent::Comment { actor, .. } => (
            "Your post got a comment".to_string(),
            format!("{} commented on your post", actor.name()),
        ),
        NotificationEvent::Reply { actor, .. } => (
            "Your comment got a reply".to_string(),
            format!("{} replied to your comment", actor.name()),
        ),
        NotificationEvent::Wishlist {
            actor,
            product_name,
            ..
        } => (
            "Your product was wishlisted".to_string(),
            format!("{} added \"{}\" to wishlist", actor.name(), product_name),
        ),
        NotificationEvent::ProfileVisit { actor, .. } => (
            "Profile visited".to_string(),
            format!("{} visited your profile", actor.name()),
        ),
        NotificationEvent::System { title, body, .. } => (title.clone(), body.clone()),
    };
    RenderedCopy { title, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Actor;

    fn dina() -> Actor {
        Actor::new(2, "Dina")
    }

    #[test]
    fn per_kind_copy() {
        let comment = render(&NotificationEvent::Comment {
            actor: dina(),
            recipient_id: 1,
            product_id: 10,
            comment_id: 20,
        });
        assert_eq!(comment.title, "Your post got a comment");
        assert_eq!(comment.body, "Dina commented on your post");

        let reply = render(&NotificationEvent::Reply {
            actor: dina(),
            recipient_id: 1,
            product_id: 10,
            comment_id: 21,
        });
        assert_eq!(reply.title, "Your comment got a reply");
        assert_eq!(reply.body, "Dina replied to your comment");

        let wishlist = render(&NotificationEvent::Wishlist {
            actor: dina(),
            recipient_id: 1,
            product_id: 10,
            product_name: "Vintage Lamp".to_string(),
        });
        assert_eq!(wishlist.title, "Your product was wishlisted");
        assert_eq!(wishlist.body, "Dina added \"Vintage Lamp\" to wishlist");

        let visit = render(&NotificationEvent::ProfileVisit {
            actor: dina(),
            recipient_id: 1,
        });
        assert_eq!(visit.title, "Profile visited");
        assert_eq!(visit.body, "Dina visited your profile");

        let system = render(&NotificationEvent::System {
            recipient_id: 1,
            title: "Maintenance".to_string(),
            body: "Back at noon".to_string(),
            product_id: None,
        });
        assert_eq!(
            system,
            RenderedCopy {
                title: "Maintenance".to_string(),
                body: "Back at noon".to_string(),
            }
        );
    }

    #[test]
    fn blank_actor_name_falls_back() {
        let copy = render(&NotificationEvent::ProfileVisit {
            actor: Actor::new(2, "  "),
            recipient_id: 1,
        });
        assert_eq!(copy.body, "Someone visited your profile");
    }
}
