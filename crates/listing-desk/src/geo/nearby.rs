use std::collections::HashSet;
use std::fmt::Display;

use futures::future::BoxFuture;
use tracing::debug;

use super::provider::{Coordinates, MapsProvider, NearbyCategory};

/// Awaits each attempt in order and returns the first non-empty result.
/// Failed attempts count as "nothing found"; later attempts are never polled
/// once one succeeds.
pub async fn first_non_empty<'a, T, E>(
    attempts: impl IntoIterator<Item = BoxFuture<'a, Result<Vec<T>, E>>>,
) -> Vec<T>
where
    E: Display,
{
    for attempt in attempts {
        match attempt.await {
            Ok(found) if !found.is_empty() => return found,
            Ok(_) => {}
            Err(err) => debug!(error = %err, "lookup attempt failed; trying next"),
        }
    }
    Vec::new()
}

/// Case- and whitespace-insensitive set of names already shown to the user.
#[derive(Debug, Default)]
pub struct NameDeduper {
    seen: HashSet<String>,
}

impl NameDeduper {
    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Records `name`, returning false when it (or a variant) was seen before.
    pub fn admit(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        !key.is_empty() && self.seen.insert(key)
    }

    /// Trimmed copies of the names not seen before, in their original order.
    pub fn admit_all<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| self.admit(name))
            .map(|name| name.trim().to_string())
            .collect()
    }
}

/// Address hints without repeats, for places that cannot be enriched.
pub fn distinct_names(names: &[String]) -> Vec<String> {
    NameDeduper::default().admit_all(names)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearbySettings {
    pub radius_meters: u32,
    pub per_category: usize,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            radius_meters: 1500,
            per_category: 3,
        }
    }
}

/// Builds the nearby list for a place: address-derived hints first, then the
/// first transit category that yields anything, then schools and hospitals.
/// Provider failures only shorten the list.
pub async fn enrich<P>(
    provider: &P,
    origin: Coordinates,
    hints: &[String],
    settings: NearbySettings,
) -> Vec<String>
where
    P: MapsProvider + ?Sized,
{
    let mut deduper = NameDeduper::default();
    let mut nearby = deduper.admit_all(hints);

    let transit = first_non_empty(NearbyCategory::TRANSIT_CHAIN.map(|category| {
        provider.nearby(origin, category, settings.radius_meters)
    }))
    .await;

    let schools = lookup_or_empty(provider, origin, NearbyCategory::School, settings).await;
    let hospitals = lookup_or_empty(provider, origin, NearbyCategory::Hospital, settings).await;

    for group in [transit, schools, hospitals] {
        let mut taken = 0;
        for name in group {
            if taken == settings.per_category {
                break;
            }
            if deduper.admit(&name) {
                nearby.push(name.trim().to_string());
                taken += 1;
            }
        }
    }

    nearby
}

async fn lookup_or_empty<P>(
    provider: &P,
    origin: Coordinates,
    category: NearbyCategory,
    settings: NearbySettings,
) -> Vec<String>
where
    P: MapsProvider + ?Sized,
{
    match provider
        .nearby(origin, category, settings.radius_meters)
        .await
    {
        Ok(found) => found,
        Err(err) => {
            debug!(category = category.place_type(), error = %err, "nearby lookup failed");
            Vec::new()
        }
    }
}
