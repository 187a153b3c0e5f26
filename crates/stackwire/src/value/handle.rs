//! Opaque handles: process-local identity tokens

/// Width of a handle on the wire: the platform pointer width.
pub const HANDLE_SIZE: usize = std::mem::size_of::<usize>();

/// An identity token for an object owned by the sending process.
///
/// The bytes are carried verbatim in native order. They only mean something
/// to the process that produced them and are never dereferenced here.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueHandle([u8; HANDLE_SIZE]);

impl OpaqueHandle {
    /// Build a handle from its raw bytes
    pub fn from_bytes(bytes: [u8; HANDLE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a handle from an address
    pub fn from_addr(addr: usize) -> Self {
        Self(addr.to_ne_bytes())
    }

    /// Build a handle naming the object behind `ptr`
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self::from_addr(ptr as usize)
    }

    /// The address the handle was built from
    pub fn addr(&self) -> usize {
        usize::from_ne_bytes(self.0)
    }

    /// Raw bytes, as written to the wire
    pub fn as_bytes(&self) -> &[u8; HANDLE_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpaqueHandle({:#x})", self.addr())
    }
}
