//! Turns a loaded search into running targets.

use std::sync::Arc;
use std::time::Duration;

use vaxfinder_core::{AppConfig, SearchConfig};

use crate::checker::Checker;
use crate::cvs::CvsChecker;
use crate::engine::{Target, TargetSet};
use crate::error::CheckError;
use crate::jefferson::JeffersonChecker;
use crate::rite_aid::{PhillyMode, RiteAidChecker};
use crate::session::SessionClient;
use crate::sink::{LocationsSink, Sinks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Cvs,
    Jefferson,
    RiteAid,
}

/// Providers to start for `search`, in start order.
///
/// CVS and Jefferson only serve the area outside Philadelphia, so philly mode
/// leaves Rite Aid as the sole provider.
#[must_use]
pub fn planned_providers(search: &SearchConfig) -> Vec<Provider> {
    let mut providers = Vec::with_capacity(3);
    if !search.philly_mode {
        if search.cvs.enabled {
            providers.push(Provider::Cvs);
        }
        if search.jefferson.enabled {
            providers.push(Provider::Jefferson);
        }
    }
    if search.rite_aid.enabled {
        providers.push(Provider::RiteAid);
    }
    providers
}

/// Builds the checker for `provider` along with its poll period.
///
/// # Errors
///
/// Returns [`CheckError::Http`] if the provider's HTTP client cannot be built.
pub fn build_checker(
    provider: Provider,
    config: &AppConfig,
    search: &SearchConfig,
    locations_sink: Option<&Arc<dyn LocationsSink>>,
) -> Result<(Box<dyn Checker>, Duration), CheckError> {
    let timeout = config.request_timeout_secs;
    let agent = config.user_agent.as_str();

    let built: (Box<dyn Checker>, u64) = match provider {
        Provider::Cvs => {
            let cvs = &search.cvs;
            let options = CvsChecker::session_options(timeout, agent, &config.cookie_dir);
            let mut checker = CvsChecker::new(
                &cvs.url,
                &cvs.state,
                cvs.exclude_cities.as_slice(),
                SessionClient::new(&options)?,
            );
            if let Some(sink) = locations_sink {
                checker = checker.with_locations_sink(Arc::clone(sink));
            }
            (Box::new(checker), cvs.check_period_secs)
        }
        Provider::Jefferson => {
            let jefferson = &search.jefferson;
            let options = JeffersonChecker::session_options(timeout, agent);
            let checker = JeffersonChecker::new(&jefferson.url, SessionClient::new(&options)?);
            (Box::new(checker), jefferson.check_period_secs)
        }
        Provider::RiteAid => {
            let rite_aid = &search.rite_aid;
            let period = Duration::from_secs(rite_aid.check_period_secs);
            let options = RiteAidChecker::session_options(timeout, agent, &config.cookie_dir);
            let checker = RiteAidChecker::new(
                &rite_aid.url,
                rite_aid.search_locations(),
                &rite_aid.home_state,
                PhillyMode::from_flag(search.philly_mode),
                period,
                SessionClient::new(&options)?,
            );
            (Box::new(checker), rite_aid.check_period_secs)
        }
    };

    Ok((built.0, Duration::from_secs(built.1)))
}

/// Builds and spawns every planned target.
///
/// Every checker is built before any is spawned, so a failure leaves nothing
/// running.
///
/// # Errors
///
/// See [`build_checker`].
pub fn start_targets(
    config: &AppConfig,
    search: &SearchConfig,
    sinks: &Sinks,
    locations_sink: Option<Arc<dyn LocationsSink>>,
) -> Result<TargetSet, CheckError> {
    let checkers = planned_providers(search)
        .into_iter()
        .map(|provider| build_checker(provider, config, search, locations_sink.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(checkers
        .into_iter()
        .map(|(checker, period)| Target::spawn(checker, period, sinks.clone()))
        .collect())
}
