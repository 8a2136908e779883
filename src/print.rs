use core::fmt;

use colored::Colorize;

use crate::{Class, Object};

impl<S> fmt::Display for Class<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}", self.name().as_str().yellow().bold())
        }
    }
}

/// `#<Class a: loaded, b: lazy>`, attributes sorted by name.
/// `{:#}` leaves out the colours.
impl<S> fmt::Display for Object<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attrs = self.class().all_lazy_attributes().into_iter().collect::<Vec<_>>();
        attrs.sort();

        if f.alternate() {
            write!(f, "#<{:#}", self.class())?;
        } else {
            write!(f, "#<{}", self.class())?;
        }

        for (i, name) in attrs.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };

            match (self.is_loaded(name), f.alternate()) {
                (true, true) => write!(f, "{sep}{name}: loaded")?,
                (false, true) => write!(f, "{sep}{name}: lazy")?,
                (true, false) => write!(f, "{sep}{name}: {}", "loaded".green())?,
                (false, false) => write!(f, "{sep}{name}: {}", "lazy".dimmed())?,
            }
        }

        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Class, Initializer, Policy};

    #[test]
    fn test_plain_object() {
        let base = Class::<()>::new("Base");
        base.attach(Policy::Strict);
        let class = base.subclass("Report");

        base.lazy_attr_reader("total", Initializer::new(|_| 42)).unwrap();
        class.lazy_attr_reader("average", Initializer::new(|_| 4.2)).unwrap();

        let obj = class.new_object(());
        assert_eq!(format!("{obj:#}"), "#<Report average: lazy, total: lazy>");

        obj.get("total").unwrap();
        assert_eq!(format!("{obj:#}"), "#<Report average: lazy, total: loaded>");
    }

    #[test]
    fn test_plain_unattached() {
        let obj = Class::<()>::new("Plain").new_object(());

        assert_eq!(format!("{obj:#}"), "#<Plain>");
        assert_eq!(format!("{:#}", obj.class()), "Plain");
    }
}
