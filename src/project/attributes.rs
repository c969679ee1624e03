//! Categorical project attributes with fixed key sets.
//!
//! Parsing is an exact match on the display label. Callers decide what an
//! unknown label means; the feature lookups map it to a zero score.

use std::fmt;

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label used on the wire and in datasets.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Parse an exact label; unknown labels return `None`.
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

label_enum! {
    /// Kind of grid infrastructure being built.
    ProjectType {
        Substation => "Substation",
        OverheadLine => "Overhead Line",
        UndergroundCable => "Underground Cable",
    }
}

label_enum! {
    /// Dominant terrain along the project site.
    Terrain {
        Plains => "Plains",
        Hilly => "Hilly",
        Coastal => "Coastal",
        Forest => "Forest",
    }
}

label_enum! {
    /// Track record of the contracted vendor.
    VendorPerformance {
        Excellent => "Excellent",
        Good => "Good",
        Average => "Average",
        Poor => "Poor",
    }
}

label_enum! {
    /// Availability of critical materials.
    MaterialAvailability {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

label_enum! {
    /// Topic assigned to free-text delay reasons.
    DelayTopic {
        LandAcquisition => "Land_Acquisition",
        SupplyChain => "Supply_Chain",
        Environmental => "Environmental",
        Execution => "Execution",
    }
}
