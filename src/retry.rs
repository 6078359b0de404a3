use std::{fmt::Display, future::Future};

use tracing::warn;

use crate::{RetryPolicy, Sleeper};

/// How the retry loop treats a single attempt outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// 2xx/3xx: handed back to the caller.
    Success,
    /// 4xx: handed back to the caller without retrying.
    ClientError,
    /// 5xx or transport failure: retried while attempts remain.
    Transient,
}

/// Classifies a final HTTP status code.
pub fn classify_status(status: u16) -> Disposition {
    match status {
        400..=499 => Disposition::ClientError,
        500..=u16::MAX => Disposition::Transient,
        _ => Disposition::Success,
    }
}

/// Responses whose status drives the retry decision.
pub(crate) trait HasStatus {
    fn status_code(&self) -> u16;
}

impl HasStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Runs `attempt` until it yields a non-transient outcome or the policy's
/// attempts are spent, and returns that outcome unchanged.
///
/// Errors are always transient. Attempts never overlap.
pub(crate) async fn run<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    url: &str,
    mut attempt: F,
) -> Result<T, E>
where
    T: HasStatus,
    E: Display,
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut index = 0usize;

    loop {
        let outcome = attempt(index).await;
        let reason = match &outcome {
            Ok(response) => {
                let status = response.status_code();
                if classify_status(status) != Disposition::Transient {
                    return outcome;
                }
                format!("status {status}")
            }
            Err(err) => err.to_string(),
        };

        if index + 1 >= max_attempts {
            warn!(url, attempts = index + 1, %reason, "retries exhausted");
            return outcome;
        }

        warn!(
            url,
            attempt = index,
            delay_ms = delay.as_millis() as u64,
            %reason,
            "transient failure, retrying"
        );
        sleeper.sleep(delay).await;
        delay = policy.next_delay(delay);
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, time::Duration};

    use super::{classify_status, run, Disposition, HasStatus};
    use crate::{RetryPolicy, TrackingSleeper};

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Reply(u16);

    impl HasStatus for Reply {
        fn status_code(&self) -> u16 {
            self.0
        }
    }

    type Scripted = Result<Reply, &'static str>;

    /// Replays `script` in order, repeating the last entry once it runs out.
    async fn replay(
        policy: RetryPolicy,
        script: Vec<Scripted>,
    ) -> (Scripted, usize, Vec<Duration>) {
        let sleeper = TrackingSleeper::new();
        let seen = RefCell::new(Vec::new());
        let outcome = run(&policy, &sleeper, "http://test/", |index| {
            seen.borrow_mut().push(index);
            let next = script[index.min(script.len() - 1)];
            async move { next }
        })
        .await;

        let seen = seen.into_inner();
        assert_eq!(seen, (0..seen.len()).collect::<Vec<_>>());
        (outcome, seen.len(), sleeper.calls())
    }

    #[test]
    fn status_classes() {
        assert_eq!(classify_status(200), Disposition::Success);
        assert_eq!(classify_status(302), Disposition::Success);
        assert_eq!(classify_status(400), Disposition::ClientError);
        assert_eq!(classify_status(429), Disposition::ClientError);
        assert_eq!(classify_status(499), Disposition::ClientError);
        assert_eq!(classify_status(500), Disposition::Transient);
        assert_eq!(classify_status(503), Disposition::Transient);
    }

    #[tokio::test]
    async fn success_and_client_errors_make_a_single_attempt() {
        for status in [200, 201, 304, 400, 404, 429] {
            let (outcome, calls, delays) =
                replay(RetryPolicy::default(), vec![Ok(Reply(status))]).await;
            assert_eq!(outcome, Ok(Reply(status)));
            assert_eq!(calls, 1, "status {status}");
            assert!(delays.is_empty());
        }
    }

    #[tokio::test]
    async fn persistent_server_error_returns_last_response() {
        let (outcome, calls, delays) =
            replay(RetryPolicy::default(), vec![Ok(Reply(503))]).await;

        assert_eq!(outcome, Ok(Reply(503)));
        assert_eq!(calls, 3);
        assert_eq!(
            delays,
            vec![Duration::from_millis(1_000), Duration::from_millis(2_000)]
        );
    }

    #[tokio::test]
    async fn recovers_after_one_transient_failure() {
        let (outcome, calls, delays) =
            replay(RetryPolicy::default(), vec![Ok(Reply(503)), Ok(Reply(200))]).await;

        assert_eq!(outcome, Ok(Reply(200)));
        assert_eq!(calls, 2);
        assert_eq!(delays, vec![Duration::from_millis(1_000)]);
    }

    #[tokio::test]
    async fn errors_are_retried_and_last_error_surfaces() {
        let (outcome, calls, delays) = replay(
            RetryPolicy::default(),
            vec![Err("reset"), Ok(Reply(502)), Err("refused")],
        )
        .await;

        assert_eq!(outcome, Err("refused"));
        assert_eq!(calls, 3);
        assert_eq!(delays.len(), 2);
    }

    #[tokio::test]
    async fn calls_are_bounded_by_consecutive_transient_outcomes() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10), 2.0);
        let (outcome, calls, delays) =
            replay(policy, vec![Err("a"), Err("b"), Ok(Reply(404))]).await;

        assert_eq!(outcome, Ok(Reply(404)));
        assert_eq!(calls, 3);
        assert_eq!(
            delays,
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), 2.0);
        let (outcome, calls, delays) = replay(policy, vec![Ok(Reply(500))]).await;

        assert_eq!(outcome, Ok(Reply(500)));
        assert_eq!(calls, 1);
        assert!(delays.is_empty());
    }
}
