//! Causal chains over `std::error::Error::source()`.

use std::error::Error;
use std::fmt;
use std::iter;

use crate::SharedError;

/// Iterate `err` and every source below it, outermost first.
pub fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    iter::successors(Some(err), |&e| e.source())
}

/// The deepest error reachable from `err` through `source()`.
pub fn root_of<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut cur = err;
    while let Some(next) = cur.source() {
        cur = next;
    }
    cur
}

/// True if `a` and `b` are the same error value.
pub fn same_error(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    std::ptr::eq(
        a as *const dyn Error as *const (),
        b as *const dyn Error as *const (),
    )
}

/// A pinned root cause.
///
/// Holds the first error ever pinned and resolves the deepest error in its
/// chain on demand. Cloning shares the underlying error.
#[derive(Clone)]
pub struct Cause {
    pinned: SharedError,
}

impl Cause {
    pub(crate) fn pin(err: SharedError) -> Self {
        Self { pinned: err }
    }

    /// The deepest error reachable from the pinned one.
    pub fn root(&self) -> &(dyn Error + 'static) {
        root_of(self.as_dyn())
    }

    /// The error that was pinned, before resolving its chain.
    pub fn pinned(&self) -> &SharedError {
        &self.pinned
    }

    /// True if the resolved root is `err` itself.
    pub fn is(&self, err: &(dyn Error + 'static)) -> bool {
        same_error(self.root(), err)
    }

    fn as_dyn(&self) -> &(dyn Error + 'static) {
        &*self.pinned
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.root(), f)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cause").field(&self.root().to_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Link {
        msg: &'static str,
        source: Option<Box<Link>>,
    }

    impl fmt::Display for Link {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl Error for Link {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source.as_deref().map(|l| l as &(dyn Error + 'static))
        }
    }

    fn three_deep() -> Link {
        Link {
            msg: "top",
            source: Some(Box::new(Link {
                msg: "middle",
                source: Some(Box::new(Link { msg: "bottom", source: None })),
            })),
        }
    }

    #[test]
    fn chain_visits_every_link() {
        let top = three_deep();
        let msgs: Vec<String> = chain(&top).map(|e| e.to_string()).collect();
        assert_eq!(msgs, ["top", "middle", "bottom"]);
    }

    #[test]
    fn root_is_deepest() {
        let top = three_deep();
        assert_eq!(root_of(&top).to_string(), "bottom");
        let lone = Link { msg: "lone", source: None };
        assert!(same_error(root_of(&lone), &lone));
    }

    #[test]
    fn cause_resolves_root() {
        let shared: SharedError = Arc::new(three_deep());
        let cause = Cause::pin(shared.clone());
        assert_eq!(cause.to_string(), "bottom");
        assert!(Arc::ptr_eq(cause.pinned(), &shared));
        assert!(cause.is(root_of(&*shared)));
        assert!(!cause.is(&*shared));
    }
}
