//! Device attributes: small text files a driver publishes for a bound client.
//!
//! Attributes come in groups. A driver creates its group in `probe` and removes it in
//! `remove`; all attributes of all groups of one client share a flat namespace, so a
//! group is refused when one of its names is already taken.
use bitflags::bitflags;
use core::fmt::{Debug, Display, Formatter};

bitflags! {
    /// Permission bits of an attribute file.
    pub struct AttrMode: u16 {
        const S_IRUSR = 0o400;
        const S_IWUSR = 0o200;
        const S_IRGRP = 0o040;
        const S_IWGRP = 0o020;
        const S_IROTH = 0o004;
        const S_IWOTH = 0o002;
        /// Readable by everyone
        const S_IRUGO = Self::S_IRUSR.bits | Self::S_IRGRP.bits | Self::S_IROTH.bits;
        /// Writable by everyone
        const S_IWUGO = Self::S_IWUSR.bits | Self::S_IWGRP.bits | Self::S_IWOTH.bits;
    }
}

/// A read-only attribute.
pub trait Attribute: Send + Sync {
    fn name(&self) -> &'static str;
    fn mode(&self) -> AttrMode;
    /// Render the current value.
    fn show(&self) -> String;
}

pub struct AttributeGroup {
    name: &'static str,
    attrs: Vec<Box<dyn Attribute>>,
}

impl AttributeGroup {
    pub fn new(name: &'static str, attrs: Vec<Box<dyn Attribute>>) -> AttributeGroup {
        AttributeGroup { name, attrs }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn find(&self, attr: &str) -> Option<&dyn Attribute> {
        self.attrs
            .iter()
            .find(|x| x.name() == attr)
            .map(|x| x.as_ref())
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attrs.iter().map(|x| x.name())
    }
}

impl Debug for AttributeGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeGroup")
            .field("name", &self.name)
            .field("attrs", &self.attr_names().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrError {
    /// An attribute with this name is already published.
    Exists(&'static str),
    /// No attribute with this name.
    NotFound,
    /// The attribute is not readable.
    PermissionDenied,
}

impl Display for AttrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            AttrError::Exists(name) => write!(f, "attribute '{}' already exists", name),
            AttrError::NotFound => write!(f, "no such attribute"),
            AttrError::PermissionDenied => write!(f, "attribute is not readable"),
        }
    }
}
