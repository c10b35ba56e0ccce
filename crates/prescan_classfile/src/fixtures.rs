//! Synthesised class files for tests.
//!
//! Produces the smallest class file the header parser accepts: a constant
//! pool holding the referenced names, no fields, no methods, no attributes.

/// Builder for a minimal class file.
#[derive(Debug, Clone)]
pub struct ClassFixture {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: u16,
    major_version: u16,
    long_constant: Option<i64>,
}

impl ClassFixture {
    /// Starts a fixture for the given internal name (`a/b/C`).
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access: 0x0021,
            major_version: 52,
            long_constant: None,
        }
    }

    /// Sets the direct supertype.
    pub fn super_name(mut self, internal_name: &str) -> Self {
        self.super_name = Some(internal_name.to_string());
        self
    }

    /// Removes the supertype, as in `java/lang/Object`.
    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    /// Adds an implemented interface.
    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    /// Sets the access flags.
    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    /// Sets the class-file major version.
    pub fn major_version(mut self, major: u16) -> Self {
        self.major_version = major;
        self
    }

    /// Adds a `CONSTANT_Long` entry to the pool.
    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constant = Some(value);
        self
    }

    /// Encodes the class file.
    pub fn build(&self) -> Vec<u8> {
        let mut pool = Vec::new();
        let mut slots: u16 = 0;

        let class_ref = |pool: &mut Vec<u8>, slots: &mut u16, name: &str| -> u16 {
            pool.push(1);
            pool.extend_from_slice(&(name.len() as u16).to_be_bytes());
            pool.extend_from_slice(name.as_bytes());
            pool.push(7);
            pool.extend_from_slice(&(*slots + 1).to_be_bytes());
            *slots += 2;
            *slots
        };

        if let Some(value) = self.long_constant {
            pool.push(5);
            pool.extend_from_slice(&value.to_be_bytes());
            slots += 2;
        }

        let this_index = class_ref(&mut pool, &mut slots, &self.name);
        let super_index = match &self.super_name {
            Some(name) => class_ref(&mut pool, &mut slots, name),
            None => 0,
        };
        let interface_indices: Vec<u16> = self
            .interfaces
            .iter()
            .map(|name| class_ref(&mut pool, &mut slots, name))
            .collect();

        let mut out = Vec::with_capacity(32 + pool.len());
        out.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&(slots + 1).to_be_bytes());
        out.extend_from_slice(&pool);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_index.to_be_bytes());
        out.extend_from_slice(&super_index.to_be_bytes());
        out.extend_from_slice(&(interface_indices.len() as u16).to_be_bytes());
        for index in interface_indices {
            out.extend_from_slice(&index.to_be_bytes());
        }
        // fields, methods, attributes
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        out
    }
}
