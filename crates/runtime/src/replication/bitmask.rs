use bitflags::bitflags;

bitflags! {
    /// Tracks which replicated fields of a health attribute set changed.
    ///
    /// Meta-attributes (Damage, Healing) are authority-local and have no
    /// bits here; they never cross the wire.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct HealthSetFields: u8 {
        const HEALTH     = 1 << 0;
        const HEALTH_MAX = 1 << 1;
    }
}

bitflags! {
    /// Tracks which replicated fields of an owned item changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct ItemFields: u8 {
        const QUANTITY     = 1 << 0;
        const MAX_QUANTITY = 1 << 1;
    }
}
