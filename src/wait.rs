use std::fmt;
use std::future::Future;
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::{Client, Locator};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::errors::{self, HarnessError};

/// Default wait budget for every named operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Default interval between condition probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Element locator. Owns its selector so wait specifications stay pure values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Css(String),
    Id(String),
    XPath(String),
}

impl Target {
    pub fn css(selector: impl Into<String>) -> Self {
        Target::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Target::Id(id.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Target::XPath(expr.into())
    }

    pub(crate) fn as_locator(&self) -> Locator<'_> {
        match self {
            Target::Css(s) => Locator::Css(s),
            Target::Id(s) => Locator::Id(s),
            Target::XPath(s) => Locator::XPath(s),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Css(s) => write!(f, "css '{}'", s),
            Target::Id(s) => write!(f, "id '{}'", s),
            Target::XPath(s) => write!(f, "xpath '{}'", s),
        }
    }
}

/// Condition kind of a wait specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Visible,
    Clickable,
    Present,
    Invisible,
    TextEquals(String),
    TextContains(String),
    AttributeContains { name: String, value: String },
    AllVisible,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible => write!(f, "visible"),
            Condition::Clickable => write!(f, "clickable"),
            Condition::Present => write!(f, "present in the DOM"),
            Condition::Invisible => write!(f, "invisible"),
            Condition::TextEquals(text) => write!(f, "showing the exact text '{}'", text),
            Condition::TextContains(text) => write!(f, "containing the text '{}'", text),
            Condition::AttributeContains { name, value } => {
                write!(f, "having attribute '{}' containing '{}'", name, value)
            }
            Condition::AllVisible => write!(f, "all visible"),
        }
    }
}

/// A pure value describing one synchronization requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub target: Target,
    pub condition: Condition,
    pub timeout: Duration,
    pub poll: Duration,
}

impl WaitSpec {
    pub fn new(target: Target, condition: Condition) -> Self {
        WaitSpec {
            target,
            condition,
            timeout: DEFAULT_TIMEOUT,
            poll: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }
}

/// What a satisfied wait resolved to. Exactly one variant, never partially
/// populated.
#[derive(Debug)]
pub enum ConditionOutcome {
    Element(Element),
    Elements(Vec<Element>),
    Satisfied,
}

/// Generic bounded retry loop. The probe reports `Ok(Some(value))` when the
/// condition holds, `Ok(None)` when it does not hold yet, and `Err` for a
/// fatal error that must propagate immediately. `run` resolves to `Ok(None)`
/// when the budget expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Poller {
    pub(crate) fn new(timeout: Duration, interval: Duration) -> Result<Self, HarnessError> {
        if timeout.is_zero() || interval.is_zero() {
            return Err(HarnessError::Config(
                "wait timeout and poll interval must be strictly positive".to_string(),
            ));
        }
        Ok(Poller { timeout, interval })
    }

    pub(crate) async fn run<T, F, Fut>(&self, mut probe: F) -> Result<Option<T>, HarnessError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, HarnessError>>,
    {
        let start = Instant::now();
        loop {
            if let Some(value) = probe().await? {
                return Ok(Some(value));
            }
            if start.elapsed() >= self.timeout {
                return Ok(None);
            }
            sleep(self.interval).await;
        }
    }
}

/// Explicit-wait engine: translates wait specifications into bounded retry
/// loops against the live session and raises descriptive timeouts.
///
/// Transient interaction errors (stale references, elements not yet attached,
/// script evaluation hiccups) are swallowed and retried until the outer
/// budget expires; any other driver error propagates immediately.
#[derive(Clone)]
pub struct Wait {
    client: Client,
    default_timeout: Duration,
    poll_interval: Duration,
    // Reused across calls at the default budget; non-default timeouts get a
    // one-shot poller.
    default_poller: Poller,
}

impl Wait {
    /// Engine with the default budget: timeout 15s, polling 500ms.
    pub fn new(client: Client) -> Self {
        Wait {
            client,
            default_timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_poller: Poller {
                timeout: DEFAULT_TIMEOUT,
                interval: DEFAULT_POLL_INTERVAL,
            },
        }
    }

    /// Engine with a custom budget. Non-positive values are rejected.
    pub fn with_timing(
        client: Client,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, HarnessError> {
        let default_poller = Poller::new(timeout, poll_interval)?;
        Ok(Wait {
            client,
            default_timeout: timeout,
            poll_interval,
            default_poller,
        })
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn poller_for(&self, timeout: Duration, poll: Duration) -> Result<Poller, HarnessError> {
        if timeout == self.default_timeout && poll == self.poll_interval {
            Ok(self.default_poller)
        } else {
            Poller::new(timeout, poll)
        }
    }

    // ---- core -------------------------------------------------------------

    /// Evaluate an arbitrary wait specification.
    pub async fn wait_for(&self, spec: &WaitSpec) -> Result<ConditionOutcome, HarnessError> {
        let poller = self.poller_for(spec.timeout, spec.poll)?;
        let client = self.client.clone();
        let target = spec.target.clone();
        let condition = spec.condition.clone();
        let outcome = poller
            .run(move || check_condition(client.clone(), target.clone(), condition.clone()))
            .await?;
        match outcome {
            Some(outcome) => Ok(outcome),
            None => Err(timeout_error(&spec.target, &spec.condition, spec.timeout)),
        }
    }

    async fn element_condition(
        &self,
        target: &Target,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Element, HarnessError> {
        let poller = self.poller_for(timeout, self.poll_interval)?;
        let client = self.client.clone();
        let probe_target = target.clone();
        let probe_condition = condition.clone();
        let found = poller
            .run(move || {
                probe_element(
                    client.clone(),
                    probe_target.clone(),
                    probe_condition.clone(),
                )
            })
            .await?;
        match found {
            Some(element) => Ok(element),
            None => Err(timeout_error(target, &condition, timeout)),
        }
    }

    async fn state_condition(
        &self,
        target: &Target,
        condition: Condition,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        let poller = self.poller_for(timeout, self.poll_interval)?;
        let client = self.client.clone();
        let probe_target = target.clone();
        let probe_condition = condition.clone();
        let held = poller
            .run(move || {
                probe_state(
                    client.clone(),
                    probe_target.clone(),
                    probe_condition.clone(),
                )
            })
            .await?;
        match held {
            Some(()) => Ok(()),
            None => Err(timeout_error(target, &condition, timeout)),
        }
    }

    // ---- named waits ------------------------------------------------------

    /// Element located and displayed.
    pub async fn visible(&self, target: &Target) -> Result<Element, HarnessError> {
        self.element_condition(target, Condition::Visible, self.default_timeout)
            .await
    }

    pub async fn visible_within(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> Result<Element, HarnessError> {
        self.element_condition(target, Condition::Visible, timeout)
            .await
    }

    /// Element displayed and enabled.
    pub async fn clickable(&self, target: &Target) -> Result<Element, HarnessError> {
        self.element_condition(target, Condition::Clickable, self.default_timeout)
            .await
    }

    /// Element attached to the DOM, displayed or not.
    pub async fn present(&self, target: &Target) -> Result<Element, HarnessError> {
        self.element_condition(target, Condition::Present, self.default_timeout)
            .await
    }

    /// Element absent or no longer displayed.
    pub async fn invisible(&self, target: &Target) -> Result<(), HarnessError> {
        self.state_condition(target, Condition::Invisible, self.default_timeout)
            .await
    }

    /// At least one match, with every match displayed.
    pub async fn all_visible(&self, target: &Target) -> Result<Vec<Element>, HarnessError> {
        let poller = self.default_poller;
        let client = self.client.clone();
        let probe_target = target.clone();
        let found = poller
            .run(move || probe_collection(client.clone(), probe_target.clone()))
            .await?;
        match found {
            Some(elements) => Ok(elements),
            None => Err(timeout_error(
                target,
                &Condition::AllVisible,
                self.default_timeout,
            )),
        }
    }

    pub async fn text_equals(&self, target: &Target, text: &str) -> Result<(), HarnessError> {
        self.state_condition(
            target,
            Condition::TextEquals(text.to_string()),
            self.default_timeout,
        )
        .await
    }

    pub async fn text_contains(&self, target: &Target, text: &str) -> Result<(), HarnessError> {
        self.state_condition(
            target,
            Condition::TextContains(text.to_string()),
            self.default_timeout,
        )
        .await
    }

    pub async fn attribute_contains(
        &self,
        target: &Target,
        name: &str,
        value: &str,
    ) -> Result<(), HarnessError> {
        self.state_condition(
            target,
            Condition::AttributeContains {
                name: name.to_string(),
                value: value.to_string(),
            },
            self.default_timeout,
        )
        .await
    }

    /// Current URL containing the given fragment. Returns the URL that
    /// satisfied the wait.
    pub async fn url_contains(&self, fragment: &str) -> Result<String, HarnessError> {
        let client = self.client.clone();
        let wanted = fragment.to_string();
        let hit = self
            .default_poller
            .run(move || {
                let client = client.clone();
                let wanted = wanted.clone();
                async move {
                    match client.current_url().await {
                        Ok(url) => {
                            let url = url.to_string();
                            if url.contains(&wanted) {
                                Ok(Some(url))
                            } else {
                                Ok(None)
                            }
                        }
                        Err(e) if errors::is_transient(&e) => Ok(None),
                        Err(e) => Err(e.into()),
                    }
                }
            })
            .await?;
        hit.ok_or_else(|| HarnessError::Timeout {
            condition: format!("current URL to contain '{}'", fragment),
            waited: self.default_timeout,
        })
    }

    // ---- safe variants ----------------------------------------------------

    /// Probe variant of [`Wait::visible`]: a timeout degrades to `Ok(None)`
    /// instead of raising. Every other error class still propagates.
    pub async fn visible_safe(&self, target: &Target) -> Result<Option<Element>, HarnessError> {
        absorb_timeout(self.visible(target).await)
    }

    /// Probe variant of [`Wait::clickable`].
    pub async fn clickable_safe(&self, target: &Target) -> Result<Option<Element>, HarnessError> {
        absorb_timeout(self.clickable(target).await)
    }

    // ---- page/application settle ------------------------------------------

    /// Document fully loaded (readyState == "complete").
    pub async fn page_loaded(&self) -> Result<(), HarnessError> {
        debug!("Waiting for document.readyState == complete");
        let client = self.client.clone();
        let done = self
            .default_poller
            .run(move || {
                let client = client.clone();
                async move {
                    match client.execute("return document.readyState;", vec![]).await {
                        Ok(value) if value.as_str() == Some("complete") => Ok(Some(())),
                        Ok(_) => Ok(None),
                        Err(e) if errors::is_transient(&e) => Ok(None),
                        Err(e) => Err(e.into()),
                    }
                }
            })
            .await?;
        match done {
            Some(()) => {
                info!("Page loaded");
                Ok(())
            }
            None => Err(HarnessError::Timeout {
                condition: "page to finish loading".to_string(),
                waited: self.default_timeout,
            }),
        }
    }

    /// No pending jQuery activity. Skipped when jQuery is not on the page.
    pub async fn jquery_idle(&self) -> Result<(), HarnessError> {
        if !self
            .js_feature_present("return typeof jQuery !== 'undefined';")
            .await
        {
            debug!("jQuery not detected, skipping idle wait");
            return Ok(());
        }
        self.script_condition("return jQuery.active === 0;", "jQuery to become idle")
            .await?;
        info!("jQuery idle");
        Ok(())
    }

    /// All Angular testabilities stable. Skipped when Angular is not on the
    /// page.
    pub async fn angular_stable(&self) -> Result<(), HarnessError> {
        if !self
            .js_feature_present("return typeof getAllAngularTestabilities !== 'undefined';")
            .await
        {
            debug!("Angular not detected, skipping stability wait");
            return Ok(());
        }
        self.script_condition(
            "return window.getAllAngularTestabilities().every(t => t.isStable());",
            "Angular to become stable",
        )
        .await?;
        info!("Angular stable");
        Ok(())
    }

    /// Full settle: page loaded, then every known client library idle, each
    /// check short-circuiting independently.
    pub async fn app_settled(&self) -> Result<(), HarnessError> {
        debug!("Waiting for the application to settle");
        self.page_loaded().await?;
        self.jquery_idle().await?;
        self.angular_stable().await?;
        Ok(())
    }

    /// Feature-detection probe. A failing probe means "feature absent", never
    /// an error.
    async fn js_feature_present(&self, script: &str) -> bool {
        match self.client.execute(script, vec![]).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn script_condition(
        &self,
        script: &str,
        description: &str,
    ) -> Result<(), HarnessError> {
        let client = self.client.clone();
        let probe_script = script.to_string();
        let held = self
            .default_poller
            .run(move || {
                let client = client.clone();
                let script = probe_script.clone();
                async move {
                    match client.execute(&script, vec![]).await {
                        Ok(value) if value.as_bool() == Some(true) => Ok(Some(())),
                        Ok(_) => Ok(None),
                        Err(e) if errors::is_transient(&e) => Ok(None),
                        Err(e) => Err(e.into()),
                    }
                }
            })
            .await?;
        held.ok_or_else(|| HarnessError::Timeout {
            condition: description.to_string(),
            waited: self.default_timeout,
        })
    }
}

fn timeout_error(target: &Target, condition: &Condition, waited: Duration) -> HarnessError {
    warn!("Timed out waiting for {} to be {}", target, condition);
    HarnessError::Timeout {
        condition: format!("{} to be {}", target, condition),
        waited,
    }
}

/// Map the timeout outcome to an absent result; every other error class
/// propagates untouched. This is the whole contract of the safe variants.
pub(crate) fn absorb_timeout<T>(
    result: Result<T, HarnessError>,
) -> Result<Option<T>, HarnessError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(HarnessError::Timeout { condition, waited }) => {
            warn!("Safe wait gave up after {:?}: {}", waited, condition);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn check_condition(
    client: Client,
    target: Target,
    condition: Condition,
) -> Result<Option<ConditionOutcome>, HarnessError> {
    match condition {
        Condition::Visible | Condition::Clickable | Condition::Present => {
            Ok(probe_element(client, target, condition)
                .await?
                .map(ConditionOutcome::Element))
        }
        Condition::AllVisible => Ok(probe_collection(client, target)
            .await?
            .map(ConditionOutcome::Elements)),
        state => Ok(probe_state(client, target, state)
            .await?
            .map(|()| ConditionOutcome::Satisfied)),
    }
}

async fn probe_element(
    client: Client,
    target: Target,
    condition: Condition,
) -> Result<Option<Element>, HarnessError> {
    let element = match client.find(target.as_locator()).await {
        Ok(element) => element,
        Err(e) if errors::is_transient(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let qualifies = match condition {
        Condition::Present => Ok(true),
        Condition::Visible => element.is_displayed().await,
        Condition::Clickable => match element.is_displayed().await {
            Ok(true) => element.is_enabled().await,
            other => other,
        },
        other => {
            return Err(HarnessError::Other(anyhow::anyhow!(
                "condition '{}' does not resolve to a single element",
                other
            )));
        }
    };
    match qualifies {
        Ok(true) => Ok(Some(element)),
        Ok(false) => Ok(None),
        Err(e) if errors::is_transient(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn probe_state(
    client: Client,
    target: Target,
    condition: Condition,
) -> Result<Option<()>, HarnessError> {
    if let Condition::Invisible = condition {
        return probe_invisible(client, target).await;
    }

    let element = match client.find(target.as_locator()).await {
        Ok(element) => element,
        Err(e) if errors::is_transient(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let held = match &condition {
        Condition::TextEquals(expected) => element
            .text()
            .await
            .map(|text| text.trim() == expected.as_str()),
        Condition::TextContains(expected) => {
            element.text().await.map(|text| text.contains(expected))
        }
        Condition::AttributeContains { name, value } => element
            .attr(name)
            .await
            .map(|attr| attr.is_some_and(|attr| attr.contains(value))),
        other => {
            return Err(HarnessError::Other(anyhow::anyhow!(
                "condition '{}' is not a state condition",
                other
            )));
        }
    };
    match held {
        Ok(true) => Ok(Some(())),
        Ok(false) => Ok(None),
        Err(e) if errors::is_transient(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn probe_invisible(client: Client, target: Target) -> Result<Option<()>, HarnessError> {
    match client.find(target.as_locator()).await {
        Ok(element) => match element.is_displayed().await {
            Ok(false) => Ok(Some(())),
            Ok(true) => Ok(None),
            // A stale or detached element is gone, which is what we wanted
            Err(e) if errors::is_transient(&e) => Ok(Some(())),
            Err(e) => Err(e.into()),
        },
        Err(e) if errors::is_transient(&e) => Ok(Some(())),
        Err(e) => Err(e.into()),
    }
}

async fn probe_collection(
    client: Client,
    target: Target,
) -> Result<Option<Vec<Element>>, HarnessError> {
    let elements = match client.find_all(target.as_locator()).await {
        Ok(elements) => elements,
        Err(e) if errors::is_transient(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if elements.is_empty() {
        return Ok(None);
    }
    for element in &elements {
        match element.is_displayed().await {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(e) if errors::is_transient(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(elements))
}

#[cfg(test)]
#[path = "wait_test.rs"]
mod wait_test;
