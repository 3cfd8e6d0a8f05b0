use super::output::print_feed;
use anyhow::Result;
use feedline_application::FeedlineClient;
use feedline_core::feed::LikeOutcome;

pub async fn feed(client: &FeedlineClient) -> Result<()> {
    client.load_feed().await?;
    print_feed(&client.feed().snapshot());
    Ok(())
}

pub async fn posts(client: &FeedlineClient) -> Result<()> {
    client.load_all_posts().await?;
    print_feed(&client.feed().snapshot());
    Ok(())
}

pub async fn post(client: &FeedlineClient, message: &str) -> Result<()> {
    let post = client.create_post(message).await?;
    println!("Published post #{}", post.id);
    Ok(())
}

/// Loads every post first so the current like state is known.
pub async fn like(client: &FeedlineClient, post_id: i64) -> Result<()> {
    client.load_all_posts().await?;
    let outcome = client.toggle_like(post_id).await?;
    let likes = client
        .feed()
        .snapshot()
        .post(post_id)
        .map(|p| p.likes_count)
        .unwrap_or_default();
    match outcome {
        LikeOutcome::Liked => println!("Liked #{} ({} likes)", post_id, likes),
        LikeOutcome::Unliked => println!("Unliked #{} ({} likes)", post_id, likes),
        LikeOutcome::AlreadyLiked => println!("#{} was already liked", post_id),
        LikeOutcome::Skipped => println!("Another like is still pending"),
    }
    Ok(())
}

pub async fn delete(client: &FeedlineClient, post_id: i64) -> Result<()> {
    client.delete_post(post_id).await?;
    println!("Deleted post #{}", post_id);
    Ok(())
}
