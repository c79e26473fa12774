use std::future::Future;
use std::time::Duration;

use cf_core::jsonpath::JsonPath;
use cf_core::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tokio::time::{
    sleep,
    timeout_at,
    Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::errors::*;

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECONDS)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS)
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WaitCondition {
    pub jsonpath: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default = "default_timeout", with = "duration_str")]
    pub timeout: Duration,

    #[serde(default = "default_poll_interval", with = "duration_str")]
    pub poll_interval: Duration,
}

impl WaitCondition {
    pub fn new(jsonpath: &str, value: Option<&str>) -> WaitCondition {
        WaitCondition {
            jsonpath: jsonpath.into(),
            value: value.map(String::from),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeleteWait {
    #[serde(default = "default_timeout", with = "duration_str")]
    pub timeout: Duration,

    #[serde(default = "default_poll_interval", with = "duration_str")]
    pub poll_interval: Duration,
}

impl Default for DeleteWait {
    fn default() -> Self {
        DeleteWait {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

// Durations are written the human way in configuration files ("30s", "20m", "1h 30m")
mod duration_str {
    use std::time::Duration;

    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// Race a future against the cancellation token.  Cancellation is checked first, so an
// already-cancelled token never lets the future run.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    what: &str,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::cancelled(what)),
        res = fut => res,
    }
}

// Check, and if the check isn't satisfied either give up (timeout reached) or sleep one interval
// and go again.  The clock starts before the first check, so a zero timeout is exactly one check
// with no sleep.  A check still running one interval past the timeout is abandoned, which bounds
// the whole wait at timeout + interval even when the apiserver stops answering.
pub async fn poll_until<F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    cancel: &CancellationToken,
    mut check: F,
) -> EmptyResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let cutoff = deadline + interval;
    let gave_up = |attempts: usize| {
        ProviderError::wait_timeout(&format!(
            "{what} (gave up after {}, {attempts} check(s))",
            humantime::format_duration(timeout)
        ))
    };

    let mut attempts = 0;
    loop {
        attempts += 1;
        let checked = cancellable(cancel, &format!("waiting for {what}"), async {
            match timeout_at(cutoff, check()).await {
                Ok(res) => res.map(Some),
                Err(_) => Ok(None),
            }
        })
        .await?;

        match checked {
            Some(true) => {
                info!("done waiting for {what} after {attempts} check(s)");
                return Ok(());
            },
            Some(false) => (),
            None => {
                warn!("check #{attempts} for {what} did not finish in time");
                return Err(gave_up(attempts));
            },
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(gave_up(attempts));
        }

        let nap = interval.min(deadline.saturating_duration_since(now));
        debug!("still waiting for {what}, checking again in {}", humantime::format_duration(nap));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!(ProviderError::cancelled(&format!("waiting for {what}"))),
            _ = sleep(nap) => (),
        }
    }
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty_match(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

// With an expected value, any matched node whose text form equals it satisfies the condition;
// without one, any non-empty match does.
pub fn condition_met(path: &JsonPath, expected: Option<&str>, doc: &Value) -> bool {
    let matches = path.query(doc);
    match expected {
        Some(want) => matches.iter().any(|v| value_to_text(v) == want),
        None => matches.iter().any(|v| !is_empty_match(v)),
    }
}

// Wait conditions run in order, each with its own timeout.  A 404 means "not there yet"; any other
// API error stops the wait.
#[instrument(skip_all, fields(object = %obj))]
pub async fn wait_for_upsert(
    client: &dyn ObjectClient,
    obj: &ObjectRef,
    conditions: &[WaitCondition],
    cancel: &CancellationToken,
) -> EmptyResult {
    let paths = conditions
        .iter()
        .map(|cond| JsonPath::parse(&cond.jsonpath))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (cond, path) in conditions.iter().zip(paths.iter()) {
        let what = match &cond.value {
            Some(v) => format!("{path} to equal {v:?} on {obj}"),
            None => format!("{path} to be present on {obj}"),
        };
        info!("waiting for {what}");

        poll_until(&what, cond.timeout, cond.poll_interval, cancel, move || async move {
            match client.get(obj).await {
                Ok(Some(current)) => Ok(condition_met(path, cond.value.as_deref(), &serde_json::to_value(&current)?)),
                Ok(None) => {
                    debug!("{obj} does not exist yet");
                    Ok(false)
                },
                Err(err) if has_api_status(&err, 404) => Ok(false),
                Err(err) => Err(err),
            }
        })
        .await?;
    }

    Ok(())
}

// Errors while polling for deletion don't end the wait; we log them and keep going until the object
// is gone or we run out of time.
#[instrument(skip_all, fields(object = %obj))]
pub async fn wait_for_delete(
    client: &dyn ObjectClient,
    obj: &ObjectRef,
    wait: &DeleteWait,
    cancel: &CancellationToken,
) -> EmptyResult {
    let what = format!("{obj} to be deleted");
    poll_until(&what, wait.timeout, wait.poll_interval, cancel, move || async move {
        match client.get(obj).await {
            Ok(None) => Ok(true),
            Ok(Some(_)) => Ok(false),
            Err(err) if has_api_status(&err, 404) => Ok(true),
            Err(err) => {
                warn!("could not check whether {obj} is gone, will retry: {err:#}");
                Ok(false)
            },
        }
    })
    .await
}
