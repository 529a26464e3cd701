use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub votes: i32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BlogError {
    #[error("Couldn't find post with id {0}")]
    NotFound(i32),
}

/// In-memory blog records, keyed by id.
#[derive(Debug, Default)]
pub struct BlogStore {
    authors: DashMap<i32, AuthorRecord>,
    posts: DashMap<i32, PostRecord>,
}

impl BlogStore {
    /// The sample data set: three authors and four posts.
    pub fn seeded() -> Self {
        let store = BlogStore::default();

        for (id, first_name, last_name) in [
            (1, "Tom", "Coleman"),
            (2, "Sashko", "Stubailo"),
            (3, "Mikhail", "Novikov"),
        ] {
            store.authors.insert(
                id,
                AuthorRecord {
                    id,
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                },
            );
        }

        for (id, author_id, title, votes) in [
            (1, 1, "Introduction to GraphQL", 2),
            (2, 2, "Welcome to Meteor", 3),
            (3, 2, "Advanced GraphQL", 1),
            (4, 3, "Launchpad is Cool", 7),
        ] {
            store.posts.insert(
                id,
                PostRecord {
                    id,
                    author_id,
                    title: title.to_string(),
                    votes,
                },
            );
        }

        store
    }

    pub fn author(&self, id: i32) -> Option<AuthorRecord> {
        self.authors.get(&id).map(|author| author.clone())
    }

    pub fn post(&self, id: i32) -> Option<PostRecord> {
        self.posts.get(&id).map(|post| post.clone())
    }

    /// Every post, ordered by id.
    pub fn posts(&self) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = self.posts.iter().map(|post| post.clone()).collect();
        posts.sort_by_key(|post| post.id);
        posts
    }

    pub fn posts_by_author(&self, author_id: i32) -> Vec<PostRecord> {
        let mut posts = self.posts();
        posts.retain(|post| post.author_id == author_id);
        posts
    }

    pub fn upvote(&self, post_id: i32) -> Result<PostRecord, BlogError> {
        self.adjust_votes(post_id, 1)
    }

    pub fn downvote(&self, post_id: i32) -> Result<PostRecord, BlogError> {
        self.adjust_votes(post_id, -1)
    }

    fn adjust_votes(&self, post_id: i32, delta: i32) -> Result<PostRecord, BlogError> {
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or(BlogError::NotFound(post_id))?;
        post.votes += delta;
        Ok(post.clone())
    }
}
