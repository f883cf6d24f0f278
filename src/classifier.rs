//! Grouping of parsed regions into categories.
//!
//! Rules are tried in order and the first match wins, so pseudo-path tags
//! such as `[heap]` always beat the filesystem-path heuristics.

use tracing::debug;

use crate::category::Category;
use crate::region::MemoryRegion;

const SHARED_OBJECT_SUFFIX: &str = ".so";
const VERSIONED_SHARED_OBJECT: &str = ".so.";

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Pathname contains a bracketed pseudo-path tag.
    Tag(&'static str, Category),
    /// Pathname starts at the filesystem root.
    RootedPath,
}

const RULES: [Rule; 6] = [
    Rule::Tag("[heap]", Category::Heap),
    Rule::Tag("[stack]", Category::Stack),
    Rule::Tag("[vvar]", Category::Vvar),
    Rule::Tag("[vsyscall]", Category::Vsyscall),
    Rule::Tag("[vdso]", Category::Vdso),
    Rule::RootedPath,
];

impl Rule {
    fn apply(self, pathname: &str) -> Option<Category> {
        match self {
            Rule::Tag(tag, category) => pathname.contains(tag).then_some(category),
            Rule::RootedPath if pathname.starts_with('/') => {
                if is_shared_object(pathname) {
                    Some(Category::SharedLibrary)
                } else {
                    Some(Category::Executable)
                }
            }
            Rule::RootedPath => None,
        }
    }
}

/// `libfoo.so` or a versioned soname such as `libc.so.6` / `libstdc++.so.6.0.30`.
fn is_shared_object(pathname: &str) -> bool {
    if pathname.ends_with(SHARED_OBJECT_SUFFIX) {
        return true;
    }
    let file_name = pathname.rsplit('/').next().unwrap_or(pathname);
    match file_name.rsplit_once(VERSIONED_SHARED_OBJECT) {
        Some((stem, version)) => {
            !stem.is_empty()
                && version
                    .split('.')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        }
        None => false,
    }
}

/// Picks the category for a single region.
pub fn classify_region(region: &MemoryRegion) -> Category {
    region
        .pathname()
        .and_then(|pathname| RULES.iter().find_map(|rule| rule.apply(pathname)))
        .unwrap_or(Category::Anonymous)
}

/// Regions grouped by category. Every category is present, possibly empty,
/// and each group keeps the input order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategorizedRegions {
    groups: [Vec<MemoryRegion>; Category::COUNT],
}

impl CategorizedRegions {
    pub fn get(&self, category: Category) -> &[MemoryRegion] {
        &self.groups[category.index()]
    }

    /// Groups in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[MemoryRegion])> {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn counts(&self) -> [(Category, usize); Category::COUNT] {
        Category::ALL.map(|c| (c, self.get(c).len()))
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn push(&mut self, category: Category, region: MemoryRegion) {
        self.groups[category.index()].push(region);
    }
}

/// Partitions `regions` into categories, preserving input order inside each.
pub fn classify<I>(regions: I) -> CategorizedRegions
where
    I: IntoIterator<Item = MemoryRegion>,
{
    let mut categorized = CategorizedRegions::default();
    for region in regions {
        let category = classify_region(&region);
        categorized.push(category, region);
    }

    debug!("Classified {} regions", categorized.total());
    categorized
}
