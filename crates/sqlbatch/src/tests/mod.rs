mod splitting;
pub(crate) mod util;
