//! Spreadsheet backend.
//!
//! Products live on the first worksheet of an xlsx workbook:
//!
//! | ID | Name | Quantity | Tag      |
//! |----|------|----------|----------|
//! | 1  | Bolt | 10       | hardware |
//! | 2  | Glue | 3        |          |
//!
//! Row 0 is the header. ID and Quantity are numeric cells, Name and Tag are
//! text cells, and a product without a tag has no cell in the Tag column.
//!
//! Every operation reads the whole sheet. Mutations rebuild the workbook with a
//! fresh header, write it to a sibling `.tmp` file and rename that over the
//! target, so a failed write leaves the previous workbook intact.

use std::{
    fs::{self, File},
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
    sync::RwLock,
};

use calamine::{Data, Reader, Xlsx, XlsxError as ReadError};
use rust_xlsxwriter::{Workbook, XlsxError as WriteError};
use stockroom_core::{DaoError, Product, ProductDao, ProductId};

pub const DEFAULT_SHEET_PATH: &str = "products.xlsx";

pub const SHEET_NAME: &str = "Products";

pub const HEADER: [&str; 4] = ["ID", "Name", "Quantity", "Tag"];

const COL_ID: u16 = 0;
const COL_NAME: u16 = 1;
const COL_QUANTITY: u16 = 2;
const COL_TAG: u16 = 3;

pub struct SheetProductDao {
    path: RwLock<PathBuf>,
}

impl Default for SheetProductDao {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetProductDao {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SHEET_PATH)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: RwLock::new(path.into()),
        }
    }

    pub fn path(&self) -> Result<PathBuf, DaoError> {
        self.path
            .read()
            .map(|p| p.clone())
            .map_err(|_| DaoError::LockPoisoned)
    }

    fn read_all(path: &Path) -> Result<Vec<Product>, DaoError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut workbook: Xlsx<_> = Xlsx::new(BufReader::new(file)).map_err(read_error)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(read_error)?,
            None => return Ok(Vec::new()),
        };
        let Some((last_row, _)) = range.end() else {
            return Ok(Vec::new());
        };

        let mut products = Vec::new();
        for row in 1..=last_row {
            let cell = |col: u16| range.get_value((row, u32::from(col)));
            if [COL_ID, COL_NAME, COL_QUANTITY, COL_TAG]
                .iter()
                .all(|&col| matches!(cell(col), None | Some(Data::Empty)))
            {
                continue;
            }

            products.push(Product {
                id: int_cell(cell(COL_ID), row, "ID")?,
                name: text_cell(cell(COL_NAME)).unwrap_or_default(),
                quantity: int_cell(cell(COL_QUANTITY), row, "Quantity")?,
                tag: text_cell(cell(COL_TAG)),
            });
        }
        Ok(products)
    }

    fn write_all(path: &Path, products: &[Product]) -> Result<(), DaoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).map_err(write_error)?;
        for (col, title) in (0u16..).zip(HEADER) {
            sheet.write_string(0, col, title).map_err(write_error)?;
        }

        for (row, p) in (1u32..).zip(products) {
            sheet.write_number(row, COL_ID, p.id).map_err(write_error)?;
            sheet.write_string(row, COL_NAME, &p.name).map_err(write_error)?;
            sheet.write_number(row, COL_QUANTITY, p.quantity).map_err(write_error)?;
            if let Some(tag) = &p.tag {
                sheet.write_string(row, COL_TAG, tag).map_err(write_error)?;
            }
        }
        let bytes = workbook.save_to_buffer().map_err(write_error)?;

        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, path)?;

        tracing::debug!(path = %path.display(), rows = products.len(), "Sheet rewritten");
        Ok(())
    }

    /// Read-all, mutate, write-all. The workbook is only rewritten when the
    /// closure reports a change.
    fn modify(&self, f: impl FnOnce(&mut Vec<Product>) -> bool) -> Result<bool, DaoError> {
        let path = self.path()?;
        let mut products = Self::read_all(&path)?;
        let changed = f(&mut products);
        if changed {
            Self::write_all(&path, &products)?;
        }
        Ok(changed)
    }
}

fn int_cell(cell: Option<&Data>, row: u32, column: &str) -> Result<i32, DaoError> {
    let malformed = |reason: String| DaoError::MalformedRecord { row: row + 1, reason };
    match cell {
        Some(Data::Int(i)) => i32::try_from(*i).map_err(|_| malformed(format!("{} {} is out of range", column, i))),
        Some(Data::Float(f)) if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 => Ok(*f as i32),
        Some(Data::Empty) | None => Err(malformed(format!("{} is missing", column))),
        Some(other) => Err(malformed(format!("{} is not a whole number: {:?}", column, other))),
    }
}

/// Empty and absent cells both read as `None`.
fn text_cell(cell: Option<&Data>) -> Option<String> {
    match cell {
        None | Some(Data::Empty) => None,
        Some(Data::String(s)) if s.is_empty() => None,
        Some(Data::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_error(e: ReadError) -> DaoError {
    match e {
        ReadError::Io(io) => DaoError::IOError(io),
        other => DaoError::Workbook(other.to_string()),
    }
}

fn write_error(e: WriteError) -> DaoError {
    DaoError::Workbook(e.to_string())
}

impl ProductDao for SheetProductDao {
    fn name(&self) -> &'static str {
        "sheet"
    }

    fn add(&self, product: Product) -> Result<Product, DaoError> {
        let path = self.path()?;
        let mut products = Self::read_all(&path)?;
        let id = products
            .iter()
            .map(|p| p.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(DaoError::IdsExhausted)?;

        let stored = product.normalized().with_id(id);
        products.push(stored.clone());
        Self::write_all(&path, &products)?;

        tracing::debug!(id = stored.id, "Product added");
        Ok(stored)
    }

    fn update(&self, product: &Product) -> Result<bool, DaoError> {
        self.modify(|products| match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product.clone().normalized();
                true
            }
            None => false,
        })
    }

    fn delete(&self, id: ProductId) -> Result<bool, DaoError> {
        self.modify(|products| {
            let before = products.len();
            products.retain(|p| p.id != id);
            products.len() != before
        })
    }

    fn list(&self) -> Result<Vec<Product>, DaoError> {
        Self::read_all(&self.path()?)
    }

    fn configure(&self, source: &str) -> Result<(), DaoError> {
        let mut path = self.path.write().map_err(|_| DaoError::LockPoisoned)?;
        *path = PathBuf::from(source);
        tracing::debug!(path = source, "Sheet path configured");
        Ok(())
    }
}
