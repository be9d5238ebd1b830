//! Schools and region membership
//!
//! A school is identified by its name within a `(class, region, season)` key.
//! For the duration of a run the region's schools are interned into a
//! [`Roster`], which assigns dense [`SchoolId`] indices in ascending name
//! order. All "school asc" orderings downstream are therefore plain id
//! comparisons.
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Dense per-run school index.
///
/// Assigned by [`Roster`] in ascending name order, so the id order coincides
/// with the name order.
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    std::cmp::Eq,
    std::cmp::PartialEq,
    std::cmp::Ord,
    std::cmp::PartialOrd,
    std::hash::Hash,
    From,
    Into,
)]
pub struct SchoolId(pub u32);

impl SchoolId {
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

/// School name, the stable identifier within a region key.
#[derive(
    Display,
    Debug,
    Clone,
    AsRef,
    From,
    Into,
    Deserialize,
    Serialize,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
)]
#[as_ref(forward)]
pub struct SchoolName(pub(crate) String);

impl From<&str> for SchoolName {
    fn from(name: &str) -> Self {
        SchoolName(String::from(name))
    }
}

/// The `(class, region, season)` triple that scopes a round-robin.
#[derive(
    Deserialize, Serialize, Debug, Display, Clone, Copy, Eq, PartialEq, std::hash::Hash,
)]
#[display(fmt = "class {} region {} season {}", class, region, season)]
pub struct RegionKey {
    pub class: u16,
    pub region: u16,
    pub season: u16,
}

impl RegionKey {
    pub fn new(class: u16, region: u16, season: u16) -> Self {
        Self {
            class,
            region,
            season,
        }
    }
}

/// Snapshot row for a school.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SchoolRecord {
    pub school: SchoolName,
    pub class: u16,
    pub region: u16,
    pub season: u16,
}

impl SchoolRecord {
    pub fn new<N: Into<SchoolName>>(school: N, class: u16, region: u16, season: u16) -> Self {
        Self {
            school: school.into(),
            class,
            region,
            season,
        }
    }

    pub fn matches(&self, key: &RegionKey) -> bool {
        self.class == key.class && self.region == key.region && self.season == key.season
    }
}

/// Immutable region membership for a run.
///
/// Holds the region's school names sorted ascending; the position of a name
/// is its [`SchoolId`]. Built once by the fixture builder and shared
/// read-only across workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    key: RegionKey,
    names: Vec<SchoolName>,
}

impl Roster {
    /// Intern a set of school names.
    ///
    /// Names are sorted and deduplicated; duplicate snapshot rows for the
    /// same school collapse to one entry.
    pub fn new(key: RegionKey, mut names: Vec<SchoolName>) -> Self {
        names.sort();
        names.dedup();
        Self { key, names }
    }

    pub fn key(&self) -> RegionKey {
        self.key
    }

    /// Number of schools in the region.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Dense id for a name, if the school is in the region.
    pub fn id_of(&self, name: &SchoolName) -> Option<SchoolId> {
        self.names
            .binary_search(name)
            .ok()
            .map(|idx| SchoolId(idx as u32))
    }

    /// Name for a dense id.
    ///
    /// # Panics
    ///
    /// Panics on an id not produced by this roster. Internally ok: ids only
    /// originate from [`Roster::id_of`] and [`Roster::ids`].
    pub fn name(&self, id: SchoolId) -> &SchoolName {
        &self.names[id.idx()]
    }

    /// Iterator over all ids, in ascending name order.
    pub fn ids(&self) -> impl Iterator<Item = SchoolId> {
        (0..self.names.len() as u32).map(SchoolId)
    }
}
