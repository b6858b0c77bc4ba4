//! Cosmetic-profile domain: first-wins over a single profile reference.

use tether_types::ProfileRef;

use super::Resolve;
use crate::store::Contributions;

/// The entry with the lowest key supplies the active profile; no entries
/// means no profile is forced.
#[derive(Debug, Default)]
pub struct ProfileResolver;

impl Resolve for ProfileResolver {
    type Payload = ProfileRef;
    type Final = Option<ProfileRef>;

    fn neutral(&self) -> Self::Final {
        None
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        entries.first().map(|(_, profile)| profile.clone())
    }
}
