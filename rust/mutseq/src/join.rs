//! Joining elements into a string.

use std::borrow::Cow;

use mutseq_common::{Result, error::Error};

use crate::{policy::IndexPolicy, sequence::Sequence};

impl<T, P: IndexPolicy> Sequence<T, P> {
    /// Joins the elements into one string, rendered by the embedded
    /// stringifier and separated by `separator`. Fails when no stringifier
    /// is configured; any failure discards the partial output.
    pub fn join(&self, separator: &str) -> Result<String> {
        let stringify = self
            .stringify
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("join"))?;
        self.join_rendered(separator, |elem| stringify(elem).map(Cow::Owned))
    }

    /// Joins the elements into one string, rendered by a call-site
    /// stringifier.
    pub fn join_with(
        &self,
        separator: &str,
        stringify: impl Fn(&T) -> Result<String>,
    ) -> Result<String> {
        self.join_rendered(separator, |elem| stringify(elem).map(Cow::Owned))
    }

    /// Joins text elements directly, separated by `separator`.
    pub fn join_str(&self, separator: &str) -> Result<String>
    where
        T: AsRef<str>,
    {
        self.join_rendered(separator, |elem| Ok(Cow::Borrowed(elem.as_ref())))
    }

    /// The separator appears between elements only. The output is
    /// accumulated in a byte sequence on this sequence's own allocator, so
    /// growth is amortized rather than one reallocation per element.
    fn join_rendered<'a>(
        &'a self,
        separator: &str,
        render: impl Fn(&'a T) -> Result<Cow<'a, str>>,
    ) -> Result<String> {
        let mut out: Sequence<u8> = Sequence::new_in(self.allocator().clone());
        for (i, elem) in self.as_slice().iter().enumerate() {
            let piece = render(elem)?;
            if i > 0 && !separator.is_empty() {
                out.splice(out.len(), 0, separator.as_bytes())?;
            }
            out.splice(out.len(), 0, piece.as_bytes())?;
        }
        Ok(String::from_utf8(out.as_slice().to_vec()).expect("utf8"))
    }
}
