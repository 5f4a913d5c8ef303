/// Summary of a successful cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub bucket: String,
    pub prefix: String,
    pub list_pages: usize,
    pub enumerated: usize,
    pub deleted: usize,
    /// Size of each delete request, in submission order.
    pub batches: Vec<usize>,
}
