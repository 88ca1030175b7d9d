/// Browser tab identifier, as reported by the host.
pub type TabId = u64;
