use bitfield_struct::bitfield;

/// Progress of an advertising set through its configuration.
#[bitfield(u8)]
pub(crate) struct AdvSetFlags {
    pub created: bool,
    pub data_set: bool,
    pub cte_params_set: bool,
    pub per_params_set: bool,
    pub cte_enabled: bool,
    pub per_started: bool,
    pub ext_started: bool,

    #[bits(1)]
    _padding: u8,
}

impl AdvSetFlags {
    /// Can CTE transmission be enabled on this set?
    pub const fn cte_ready(&self) -> bool {
        self.cte_params_set() && self.per_params_set()
    }
}
