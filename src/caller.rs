use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderName},
};
use std::convert::Infallible;

/// Name of the header the authenticating gateway uses to pass the user id.
#[derive(Debug, Clone)]
pub struct CallerHeader(pub HeaderName);

/// Identity of whoever made the request, `None` when anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller(pub Option<String>);

impl Caller {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    CallerHeader: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CallerHeader(header) = CallerHeader::from_ref(state);

        let user_id = parts
            .headers
            .get(&header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        Ok(Caller(user_id))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[derive(Clone)]
    struct TestState(CallerHeader);

    impl FromRef<TestState> for CallerHeader {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    async fn caller_of(header: Option<&str>) -> Caller {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-user-id", value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        let state = TestState(CallerHeader(HeaderName::from_static("x-user-id")));
        Caller::from_request_parts(&mut parts, &state).await.unwrap()
    }

    #[tokio::test]
    async fn reads_header() {
        assert_eq!(caller_of(Some("u1")).await.id(), Some("u1"));
        assert_eq!(caller_of(Some("  u2 ")).await.id(), Some("u2"));
    }

    #[tokio::test]
    async fn anonymous_without_header() {
        assert_eq!(caller_of(None).await, Caller(None));
        assert_eq!(caller_of(Some("   ")).await, Caller(None));
    }
}
