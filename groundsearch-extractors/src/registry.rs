//! Strategy registry and extraction modes.
//!
//! Strategies have an associated record type, so they cannot sit in one
//! list as trait objects. The registry lists them by [`StrategyKind`]
//! instead and dispatches each kind to its concrete strategy.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use groundsearch_fetch::SearchClient;
use groundsearch_store::InputTable;

use crate::battery::BatteryInfoStrategy;
use crate::error::ProcessError;
use crate::processor::{ProcessingReport, ProcessorConfig, RowProcessor};
use crate::specs::ProductSpecsStrategy;
use crate::strategy::ExtractionStrategy;

// ============================================================================
// Strategy Kind
// ============================================================================

/// The available extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Weight and dimensions.
    ProductSpecs,
    /// Battery information.
    BatteryInfo,
}

impl StrategyKind {
    /// Returns this kind's descriptor.
    pub fn descriptor(self) -> &'static StrategyDescriptor {
        StrategyRegistry::get(self)
    }

    /// Runs this strategy over `input`, writing to `output_path`.
    ///
    /// # Errors
    ///
    /// See [`RowProcessor::run`].
    pub async fn run<C>(
        self,
        client: &C,
        input: &InputTable,
        output_path: &Path,
        config: ProcessorConfig,
    ) -> Result<ProcessingReport, ProcessError>
    where
        C: SearchClient + ?Sized,
    {
        match self {
            Self::ProductSpecs => {
                RowProcessor::new(client, &ProductSpecsStrategy, config)
                    .run(input, output_path)
                    .await
            }
            Self::BatteryInfo => {
                RowProcessor::new(client, &BatteryInfoStrategy, config)
                    .run(input, output_path)
                    .await
            }
        }
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Static facts about one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDescriptor {
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Short identifier.
    pub id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Default output file suffix.
    pub output_suffix: &'static str,
    /// Extracted output columns.
    pub fields: &'static [&'static str],
}

impl StrategyDescriptor {
    fn of<S: ExtractionStrategy>(kind: StrategyKind, strategy: &S) -> Self {
        Self {
            kind,
            id: strategy.id(),
            display_name: strategy.display_name(),
            output_suffix: strategy.default_output_suffix(),
            fields: strategy.output_fields(),
        }
    }
}

static DESCRIPTORS: OnceLock<Vec<StrategyDescriptor>> = OnceLock::new();

fn init_descriptors() -> Vec<StrategyDescriptor> {
    vec![
        StrategyDescriptor::of(StrategyKind::ProductSpecs, &ProductSpecsStrategy),
        StrategyDescriptor::of(StrategyKind::BatteryInfo, &BatteryInfoStrategy),
    ]
}

/// Lookup of all strategy descriptors.
pub struct StrategyRegistry;

impl StrategyRegistry {
    /// Returns every descriptor, specs first.
    pub fn all() -> &'static [StrategyDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Returns the descriptor for `kind`.
    pub fn get(kind: StrategyKind) -> &'static StrategyDescriptor {
        let index = match kind {
            StrategyKind::ProductSpecs => 0,
            StrategyKind::BatteryInfo => 1,
        };
        &Self::all()[index]
    }

    /// Looks a descriptor up by identifier.
    pub fn get_by_id(id: &str) -> Option<&'static StrategyDescriptor> {
        Self::all().iter().find(|d| d.id.eq_ignore_ascii_case(id.trim()))
    }
}

// ============================================================================
// Extraction Mode
// ============================================================================

/// What a processing run extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMode {
    /// Product specifications only.
    Specs,
    /// Battery information only.
    Battery,
    /// Specifications, then battery information, each to its own file.
    Both,
}

impl ExtractionMode {
    /// Strategies this mode runs, in order.
    pub fn strategies(self) -> &'static [StrategyKind] {
        match self {
            Self::Specs => &[StrategyKind::ProductSpecs],
            Self::Battery => &[StrategyKind::BatteryInfo],
            Self::Both => &[StrategyKind::ProductSpecs, StrategyKind::BatteryInfo],
        }
    }

    /// Mode name as typed on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Specs => "specs",
            Self::Battery => "battery",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "specs" | "spec" | "specifications" => Ok(Self::Specs),
            "battery" | "batteries" => Ok(Self::Battery),
            "both" | "all" => Ok(Self::Both),
            other => Err(format!(
                "unknown extraction mode {other:?} (expected specs, battery or both)"
            )),
        }
    }
}
