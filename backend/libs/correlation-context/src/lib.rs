//! Ambient correlation/trace context carried across async suspension points.
//!
//! Values are stored in `tokio::task_local!` storage, scoped by [`CorrelationContext::scope`].
//! Unlike a shared `Arc<RwLock<_>>` (the crypto-core CorrelationContext pattern this
//! supersedes), a task-local is bound to the logical task that entered the scope: two
//! concurrent `scope` calls never observe each other's values, even when both await
//! the same executor.

use uuid::Uuid;

pub const HTTP_CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const HTTP_TRACEPARENT_HEADER: &str = "traceparent";

tokio::task_local! {
    static CONTEXT: CorrelationContext;
}

/// Correlation and W3C trace identifiers for one logical unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationContext {
    pub correlation_id: String,
    pub trace_id: String,
    pub span_id: String,
}

impl CorrelationContext {
    /// Build a fresh context with newly generated identifiers.
    pub fn generate() -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            trace_id: new_trace_id(),
            span_id: new_span_id(),
        }
    }

    /// Build a context from values observed on the wire, falling back to
    /// freshly generated identifiers for anything missing.
    pub fn from_parts(correlation_id: Option<String>, traceparent: Option<&str>) -> Self {
        let (trace_id, span_id) = traceparent
            .and_then(parse_traceparent)
            .unwrap_or_else(|| (new_trace_id(), new_span_id()));

        Self {
            correlation_id: correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            trace_id,
            span_id,
        }
    }

    pub fn traceparent(&self) -> String {
        format!("00-{}-{}-01", self.trace_id, self.span_id)
    }

    /// Run `fut` with `self` installed as the ambient context. Any code awaited
    /// within `fut`, including across `.await` points, observes [`current`].
    pub async fn scope<F, T>(self, fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        CONTEXT.scope(self, fut).await
    }
}

/// Read the ambient context, if any code is currently inside a `scope`.
pub fn current() -> Option<CorrelationContext> {
    CONTEXT.try_with(|ctx| ctx.clone()).ok()
}

/// Read the ambient correlation id, or a freshly generated one if no scope is active.
pub fn correlation_id_or_new() -> String {
    current()
        .map(|c| c.correlation_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn new_trace_id() -> String {
    format!("{:032x}", Uuid::new_v4().as_u128())
}

fn new_span_id() -> String {
    // W3C span-id is 8 bytes; derive from the low 64 bits of a fresh UUID.
    format!("{:016x}", Uuid::new_v4().as_u128() as u64)
}

fn parse_traceparent(header: &str) -> Option<(String, String)> {
    let mut parts = header.split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let span_id = parts.next()?;
    let _flags = parts.next()?;
    if version.len() != 2 || trace_id.len() != 32 || span_id.len() != 16 {
        return None;
    }
    Some((trace_id.to_string(), span_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_makes_context_visible_inside() {
        let ctx = CorrelationContext::generate();
        let expected = ctx.correlation_id.clone();
        ctx.scope(async move {
            assert_eq!(current().unwrap().correlation_id, expected);
        })
        .await;
    }

    #[test]
    fn outside_any_scope_current_is_none() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn concurrent_scopes_are_isolated() {
        // Testable property: N concurrent run(ctx_i, fn_i) scopes, each fn_i
        // observes only ctx_i.
        let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(3));

        let make_task = |label: &'static str, barrier: std::sync::Arc<tokio::sync::Barrier>| {
            let ctx = CorrelationContext {
                correlation_id: label.to_string(),
                trace_id: new_trace_id(),
                span_id: new_span_id(),
            };
            ctx.scope(async move {
                // Yield so all three tasks interleave before asserting.
                barrier.wait().await;
                tokio::task::yield_now().await;
                assert_eq!(current().unwrap().correlation_id, label);
            })
        };

        tokio::join!(
            make_task("a", barrier.clone()),
            make_task("b", barrier.clone()),
            make_task("c", barrier.clone()),
        );
    }

    #[test]
    fn traceparent_round_trips() {
        let ctx = CorrelationContext::generate();
        let header = ctx.traceparent();
        let (trace_id, span_id) = parse_traceparent(&header).unwrap();
        assert_eq!(trace_id, ctx.trace_id);
        assert_eq!(span_id, ctx.span_id);
    }

    #[test]
    fn from_parts_falls_back_when_traceparent_missing() {
        let ctx = CorrelationContext::from_parts(Some("abc".to_string()), None);
        assert_eq!(ctx.correlation_id, "abc");
        assert_eq!(ctx.trace_id.len(), 32);
        assert_eq!(ctx.span_id.len(), 16);
    }

    #[test]
    fn from_parts_uses_traceparent_when_present() {
        let header = "00-11111111111111111111111111111111-2222222222222222-01";
        let ctx = CorrelationContext::from_parts(None, Some(header));
        assert_eq!(ctx.trace_id, "11111111111111111111111111111111");
        assert_eq!(ctx.span_id, "2222222222222222");
    }

    #[test]
    fn malformed_traceparent_is_rejected() {
        assert!(parse_traceparent("not-a-traceparent").is_none());
    }
}
