use feedline_application::FeedlineClient;
use feedline_core::feed::FeedSnapshot;
use feedline_core::notification::Severity;
use feedline_core::user::User;

/// Prints queued notifications to stderr, oldest first.
pub fn print_notifications(client: &FeedlineClient) {
    for notification in client.notifications().snapshot() {
        let label = match notification.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        eprintln!("[{}] {}", label, notification.message);
    }
}

pub fn print_feed(feed: &FeedSnapshot) {
    if feed.posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for post in &feed.posts {
        let marker = if feed.is_liked(post.id) { "♥" } else { "♡" };
        println!(
            "#{:<5} @{:<20} {} {:>4}  {}",
            post.id, post.author_alias, marker, post.likes_count, post.message
        );
    }
}

pub fn print_user(user: &User) {
    println!("{} (@{})", user.display_name(), user.alias);
    println!("  id:    {}", user.id);
    println!("  email: {}", user.email);
    if !user.date_of_birth.is_empty() {
        println!("  born:  {}", user.date_of_birth);
    }
    if user.is_admin() {
        println!("  role:  administrator");
    }
}
