use std::{
    ffi::{c_char, c_double, c_int, c_longlong, CStr},
    slice,
};

#[derive(PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Blob,
    Null,
    Text,
}

/// A single result row, only valid until the owning statement is advanced
#[derive(Clone, Copy)]
pub struct Row {
    stmt: *mut libsqlite3_sys::sqlite3_stmt,
}

impl Row {
    pub fn new(stmt: *mut libsqlite3_sys::sqlite3_stmt) -> Self {
        Self { stmt }
    }

    pub fn column_type(&self, index: c_int) -> ColumnType {
        match unsafe { libsqlite3_sys::sqlite3_column_type(self.stmt, index) } {
            libsqlite3_sys::SQLITE_INTEGER => ColumnType::Integer,
            libsqlite3_sys::SQLITE_FLOAT => ColumnType::Float,
            libsqlite3_sys::SQLITE_BLOB => ColumnType::Blob,
            libsqlite3_sys::SQLITE_TEXT => ColumnType::Text,
            _ => ColumnType::Null,
        }
    }

    pub fn column_is_null(&self, index: c_int) -> bool {
        self.column_type(index) == ColumnType::Null
    }

    pub fn column_string(&self, index: c_int) -> Option<&str> {
        let data = unsafe { libsqlite3_sys::sqlite3_column_text(self.stmt, index) };
        if !data.is_null() {
            let c_str = unsafe { CStr::from_ptr(data.cast::<c_char>()) };
            return c_str.to_str().ok();
        }
        None
    }

    pub fn column_blob(&self, index: c_int) -> Option<&[u8]> {
        let data = unsafe { libsqlite3_sys::sqlite3_column_blob(self.stmt, index) };
        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(self.stmt, index) };
        if !data.is_null() && size > 0 {
            return Some(unsafe { slice::from_raw_parts(data.cast::<u8>(), size as usize) });
        }
        None
    }

    pub fn column_double(&self, index: c_int) -> c_double {
        unsafe { libsqlite3_sys::sqlite3_column_double(self.stmt, index) }
    }

    pub fn column_int(&self, index: c_int) -> c_int {
        unsafe { libsqlite3_sys::sqlite3_column_int(self.stmt, index) }
    }

    pub fn column_int64(&self, index: c_int) -> c_longlong {
        unsafe { libsqlite3_sys::sqlite3_column_int64(self.stmt, index) }
    }
}
