//! The sample blog schema: posts, authors and a counter subscription.

pub mod counter;
pub mod store;

use std::{sync::Arc, time::Duration};

use async_graphql::{
    Context, ErrorExtensions, Object, Result, Schema, Subscription as SubscriptionObject,
};
use futures::{Stream, StreamExt};

use self::{
    counter::CounterHub,
    store::{AuthorRecord, BlogError, BlogStore, PostRecord},
};

pub type BlogSchema = Schema<Query, Mutation, Subscription>;

impl ErrorExtensions for BlogError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| match self {
            BlogError::NotFound(_) => extensions.set("code", "NOT_FOUND"),
        })
    }
}

pub struct Author(AuthorRecord);

#[Object]
impl Author {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn first_name(&self) -> Option<&str> {
        Some(&self.0.first_name)
    }

    async fn last_name(&self) -> Option<&str> {
        Some(&self.0.last_name)
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Option<Vec<Option<Post>>>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(Some(
            store
                .posts_by_author(self.0.id)
                .into_iter()
                .map(|post| Some(Post(post)))
                .collect(),
        ))
    }
}

pub struct Post(PostRecord);

#[Object]
impl Post {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn title(&self) -> Option<&str> {
        Some(&self.0.title)
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<Author>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(store.author(self.0.author_id).map(Author))
    }

    async fn votes(&self) -> Option<i32> {
        Some(self.0.votes)
    }
}

pub struct Counter {
    count: i32,
}

#[Object]
impl Counter {
    async fn count(&self) -> i32 {
        self.count
    }

    async fn count_str(&self) -> Option<String> {
        Some(format!("Current count: {}", self.count))
    }
}

pub struct Query;

#[Object]
impl Query {
    async fn posts(&self, ctx: &Context<'_>) -> Result<Option<Vec<Option<Post>>>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(Some(
            store
                .posts()
                .into_iter()
                .map(|post| Some(Post(post)))
                .collect(),
        ))
    }

    async fn author(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Author>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(store.author(id).map(Author))
    }
}

/// Records a missing post as an error on the current field and resolves it to
/// null, so sibling mutations in the same operation keep their results.
fn report_missing(ctx: &Context<'_>, outcome: Result<PostRecord, BlogError>) -> Option<Post> {
    match outcome {
        Ok(post) => Some(Post(post)),
        Err(error) => {
            ctx.add_error(ctx.set_error_path(error.extend().into_server_error(ctx.item.pos)));
            None
        }
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn upvote_post(&self, ctx: &Context<'_>, post_id: i32) -> Result<Option<Post>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(report_missing(ctx, store.upvote(post_id)))
    }

    async fn downvote_post(&self, ctx: &Context<'_>, post_id: i32) -> Result<Option<Post>> {
        let store = ctx.data::<Arc<BlogStore>>()?;
        Ok(report_missing(ctx, store.downvote(post_id)))
    }
}

pub struct Subscription;

#[SubscriptionObject]
impl Subscription {
    async fn counter(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Counter>> {
        let hub = ctx.data::<CounterHub>()?;
        Ok(hub.subscribe().map(|count| Counter { count }))
    }
}

/// Builds the blog schema over a freshly seeded store.
pub fn get_schema(counter_interval: Duration) -> BlogSchema {
    Schema::build(Query, Mutation, Subscription)
        .data(Arc::new(BlogStore::seeded()))
        .data(CounterHub::new(counter_interval))
        .finish()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_graphql::{value, Request};
    use futures::StreamExt;

    use super::get_schema;

    #[tokio::test]
    async fn upvote_returns_the_updated_post() {
        let schema = get_schema(Duration::from_secs(2));

        let response = schema
            .execute("mutation { upvotePost(postId: 1) { id votes } }")
            .await;

        assert!(response.errors.is_empty());
        assert_eq!(
            response.data,
            value!({"upvotePost": {"id": 1, "votes": 3}})
        );
    }

    #[tokio::test]
    async fn downvote_of_unknown_post_is_a_field_error() {
        let schema = get_schema(Duration::from_secs(2));

        let response = schema
            .execute("mutation { downvotePost(postId: 999) { id } }")
            .await;
        let listing = schema.execute("{ posts { id votes } }").await;

        assert_eq!(response.errors.len(), 1);
        insta::assert_snapshot!(response.errors[0].message, @"Couldn't find post with id 999");
        assert_eq!(response.data, value!({"downvotePost": null}));
        assert_eq!(
            listing.data,
            value!({"posts": [
                {"id": 1, "votes": 2},
                {"id": 2, "votes": 3},
                {"id": 3, "votes": 1},
                {"id": 4, "votes": 7}
            ]})
        );
    }

    #[tokio::test]
    async fn missing_post_nulls_only_its_own_alias() {
        let schema = get_schema(Duration::from_secs(2));

        let response = schema
            .execute(
                "mutation { bad: downvotePost(postId: 999) { id } good: upvotePost(postId: 1) { id votes } }",
            )
            .await;

        assert_eq!(
            response.data,
            value!({"bad": null, "good": {"id": 1, "votes": 3}})
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.errors[0].path,
            vec![async_graphql::PathSegment::Field("bad".to_string())]
        );
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"));
        assert_eq!(code, Some(&value!("NOT_FOUND")));
    }

    #[tokio::test]
    async fn author_resolves_posts() {
        let schema = get_schema(Duration::from_secs(2));

        let response = schema
            .execute(Request::new(
                "{ author(id: 2) { firstName lastName posts { title author { id } } } }",
            ))
            .await;

        assert_eq!(
            response.data,
            value!({"author": {
                "firstName": "Sashko",
                "lastName": "Stubailo",
                "posts": [
                    {"title": "Welcome to Meteor", "author": {"id": 2}},
                    {"title": "Advanced GraphQL", "author": {"id": 2}}
                ]
            }})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn counter_subscription_renders_count_strings() {
        let schema = get_schema(Duration::from_secs(2));

        let mut stream = schema.execute_stream("subscription { counter { count countStr } }");
        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();

        assert_eq!(
            first.data,
            value!({"counter": {"count": 0, "countStr": "Current count: 0"}})
        );
        assert_eq!(
            second.data,
            value!({"counter": {"count": 1, "countStr": "Current count: 1"}})
        );
    }

    #[test]
    fn sdl_matches_the_blog_shape() {
        let sdl = get_schema(Duration::from_secs(2)).sdl();

        for expected in [
            "posts: [Post]",
            "author(id: Int!): Author",
            "upvotePost(postId: Int!): Post",
            "counter: Counter!",
            "countStr: String",
        ] {
            assert!(sdl.contains(expected), "missing `{expected}` in:\n{sdl}");
        }
    }
}
