//! `/articles` routes.

use http::StatusCode;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use switchyard::core::{
    handler_fn, ContextKey, ErrorKind, Handler, Request, RequestContext, Response, ResponseExt,
};
use switchyard::middleware::{from_fn, Middleware, Next};
use switchyard::server::{Router, RouterError};

use crate::store::{Article, ArticleDraft, SharedStore};

/// Context key for the article loaded by [`article_ctx`].
pub struct ArticleKey;

impl ContextKey for ArticleKey {
    type Value = Article;
    const NAME: &'static str = "article";
}

/// Builds the `/articles` sub-router.
pub fn router(store: &SharedStore) -> Result<Router, RouterError> {
    let mut r = Router::new();
    r.get("/", list_articles(store.clone()))?;
    r.get("/{month}-{day}-{year}", list_articles_by_date(store.clone()))?;
    r.post("/", create_article(store.clone()))?;
    r.get("/search", search_articles(store.clone()))?;
    r.get("/{articleSlug:[a-z-]+}", get_article_by_slug(store.clone()))?;

    r.route("/{articleID}", |r| {
        r.use_middleware(article_ctx(store.clone()))?;
        r.get("/", get_article())?;
        r.put("/", update_article(store.clone()))?;
        r.delete("/", delete_article(store.clone()))
    })?;

    Ok(r)
}

/// Loads the article named by `{articleID}` into the context, or answers
/// 404 without running the rest of the chain.
pub fn article_ctx(store: SharedStore) -> impl Middleware {
    from_fn(
        "article_ctx",
        move |ctx: RequestContext, req: Request, next: Next| {
            let article = ctx.param("articleID").and_then(|id| store.get(id));
            async move {
                match article {
                    Some(article) => next.run(ctx.with_value::<ArticleKey>(article), req).await,
                    None => ErrorKind::NotFound.into_response(),
                }
            }
        },
    )
}

#[derive(Serialize)]
struct ArticleList<'a> {
    articles: &'a [Article],
}

fn list_articles(store: SharedStore) -> impl Handler {
    handler_fn(move |_ctx, _req| {
        let articles = store.list();
        async move { Response::json(StatusCode::OK, &ArticleList { articles: &articles }) }
    })
}

fn list_articles_by_date(store: SharedStore) -> impl Handler {
    handler_fn(move |ctx: RequestContext, _req| {
        let params = ctx.params();
        let date = format!(
            "{}-{}-{}",
            params.get("year").unwrap_or_default(),
            params.get("month").unwrap_or_default(),
            params.get("day").unwrap_or_default()
        );
        let articles: Vec<Article> = store
            .list()
            .into_iter()
            .filter(|a| a.published == date)
            .collect();
        async move { Response::json(StatusCode::OK, &ArticleList { articles: &articles }) }
    })
}

fn create_article(store: SharedStore) -> impl Handler {
    handler_fn(move |_ctx, req: Request| {
        let store = store.clone();
        async move {
            match read_draft(req).await {
                Ok(draft) => Response::json(StatusCode::CREATED, &store.create(draft)),
                Err(response) => response,
            }
        }
    })
}

/// Query string of `GET /articles/search`.
#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

fn search_articles(store: SharedStore) -> impl Handler {
    handler_fn(move |_ctx, req: Request| {
        let found = read_query(&req).map(|query| {
            let needle = query.q.unwrap_or_default().to_lowercase();
            store
                .list()
                .into_iter()
                .filter(|a| a.title.to_lowercase().contains(&needle))
                .collect::<Vec<Article>>()
        });
        async move {
            match found {
                Ok(articles) => {
                    Response::json(StatusCode::OK, &ArticleList { articles: &articles })
                }
                Err(response) => response,
            }
        }
    })
}

fn get_article_by_slug(store: SharedStore) -> impl Handler {
    handler_fn(move |ctx: RequestContext, _req| {
        let article = ctx.param("articleSlug").and_then(|s| store.get_by_slug(s));
        async move {
            match article {
                Some(article) => Response::json(StatusCode::OK, &article),
                None => ErrorKind::NotFound.into_response(),
            }
        }
    })
}

fn get_article() -> impl Handler {
    handler_fn(|ctx: RequestContext, _req| async move {
        match ctx.value::<ArticleKey>() {
            Some(article) => Response::text(format!("title:{}", article.title)),
            None => ErrorKind::ContextValueMissing.into_response(),
        }
    })
}

fn update_article(store: SharedStore) -> impl Handler {
    handler_fn(move |ctx: RequestContext, req: Request| {
        let store = store.clone();
        async move {
            let Some(id) = ctx.value::<ArticleKey>().map(|a| a.id.clone()) else {
                return ErrorKind::ContextValueMissing.into_response();
            };
            match read_draft(req).await {
                Ok(draft) => match store.update(&id, draft) {
                    Some(article) => Response::json(StatusCode::OK, &article),
                    None => ErrorKind::NotFound.into_response(),
                },
                Err(response) => response,
            }
        }
    })
}

fn delete_article(store: SharedStore) -> impl Handler {
    handler_fn(move |ctx: RequestContext, _req| {
        let deleted = ctx
            .value::<ArticleKey>()
            .and_then(|a| store.delete(&a.id));
        async move {
            match deleted {
                Some(article) => Response::json(StatusCode::OK, &article),
                None => ErrorKind::NotFound.into_response(),
            }
        }
    })
}

async fn read_draft(req: Request) -> Result<ArticleDraft, Response> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map(|c| c.to_bytes())
        .unwrap_or_default();

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "rejected article body");
        Response::json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_BODY",
            "Body must be a JSON article",
        )
    })
}

fn read_query(req: &Request) -> Result<SearchQuery, Response> {
    serde_urlencoded::from_str(req.uri().query().unwrap_or_default()).map_err(|e| {
        tracing::debug!(error = %e, "rejected search query");
        Response::json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_QUERY",
            "Query string could not be parsed",
        )
    })
}
