//! Region categories and the user's choice of which ones to show.

use std::fmt;

/// Semantic kind of a mapped region. Every region lands in exactly one.
///
/// Declaration order is the order categories are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Executable,
    SharedLibrary,
    Heap,
    Stack,
    Vvar,
    Vsyscall,
    Vdso,
    Anonymous,
}

impl Category {
    pub const COUNT: usize = 8;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Executable,
        Category::SharedLibrary,
        Category::Heap,
        Category::Stack,
        Category::Vvar,
        Category::Vsyscall,
        Category::Vdso,
        Category::Anonymous,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in reports.
    pub const fn label(self) -> &'static str {
        match self {
            Category::Executable => "executable",
            Category::SharedLibrary => "shared_libs",
            Category::Heap => "heap",
            Category::Stack => "stack",
            Category::Vvar => "vvar",
            Category::Vsyscall => "vsyscall",
            Category::Vdso => "vdso",
            Category::Anonymous => "none",
        }
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of categories, iterated in report order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet(u8);

impl CategorySet {
    pub const fn new() -> Self {
        CategorySet(0)
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Category> for CategorySet {
    fn extend<I: IntoIterator<Item = Category>>(&mut self, iter: I) {
        for category in iter {
            self.insert(category);
        }
    }
}

/// Which categories to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(CategorySet),
}

impl Selection {
    pub fn includes(&self, category: Category) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(category),
        }
    }

    /// Selected categories in report order.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.includes(*c))
    }
}

impl From<CategorySet> for Selection {
    fn from(set: CategorySet) -> Self {
        Selection::Only(set)
    }
}
