//! Spreadsheet endpoints
//!
//! Ranges use the service notation `<sheetId>!<start>:<end>`, e.g.
//! `0b12!A1:C3`. Cell values are arbitrary JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{query, segment, with_json, NoData};
use crate::client::{Client, Response};
use crate::error::Result;
use crate::http::{HttpClient, HttpRequest};

const SHEETS_V2: &str = "/open-apis/sheets/v2/spreadsheets";
const SHEETS_V3: &str = "/open-apis/sheets/v3/spreadsheets";

// === Spreadsheets ===

#[derive(Debug, Serialize)]
struct CreateSpreadsheetRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_token: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpreadsheetCreated {
    pub spreadsheet: Spreadsheet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Spreadsheet {
    pub title: String,
    pub folder_token: String,
    pub url: String,
    pub spreadsheet_token: String,
}

// === Sheet metadata ===

/// Optional query parameters of [`Client::get_sheet_meta`]
#[derive(Debug, Clone, Default)]
pub struct SheetMetaOptions {
    /// `protectedRange` to include protected range details
    pub ext_fields: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetMeta {
    pub properties: SpreadsheetProperties,
    pub sheets: Vec<SheetInfo>,
    pub spreadsheet_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: String,
    pub owner_user: i64,
    pub sheet_count: i64,
    pub revision: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetInfo {
    pub sheet_id: String,
    pub title: String,
    pub index: i64,
    pub row_count: i64,
    pub column_count: i64,
    pub frozen_col_count: i64,
    pub frozen_row_count: i64,
    pub merges: Vec<MergedCells>,
    pub protected_range: Vec<ProtectedRange>,
    /// Present when the sheet is an embedded block rather than a grid
    pub block_info: Option<BlockInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergedCells {
    pub column_count: i64,
    pub row_count: i64,
    pub start_column_index: i64,
    pub start_row_index: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectedRange {
    pub dimension: Dimension,
    pub protect_id: String,
    pub sheet_id: String,
    pub lock_info: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockInfo {
    pub block_token: String,
    pub block_type: String,
}

// === Sheet operations ===

/// One step of [`Client::batch_update_sheets`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetOperation {
    AddSheet {
        properties: NewSheet,
    },
    CopySheet {
        source: SheetRef,
        destination: CopyDestination,
    },
    DeleteSheet {
        #[serde(rename = "sheetId")]
        sheet_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSheet {
    pub title: String,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRef {
    pub sheet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyDestination {
    pub title: String,
}

impl SheetOperation {
    /// Adds a sheet titled `title` at position `index`
    pub fn add(title: impl Into<String>, index: i64) -> Self {
        Self::AddSheet {
            properties: NewSheet {
                title: title.into(),
                index,
            },
        }
    }

    /// Copies `sheet_id` into a new sheet titled `title`
    pub fn copy(sheet_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::CopySheet {
            source: SheetRef {
                sheet_id: sheet_id.into(),
            },
            destination: CopyDestination {
                title: title.into(),
            },
        }
    }

    pub fn delete(sheet_id: impl Into<String>) -> Self {
        Self::DeleteSheet {
            sheet_id: sheet_id.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [SheetOperation],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SheetReplies {
    pub replies: Vec<SheetReply>,
}

/// Outcome of one [`SheetOperation`]; exactly one field is set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetReply {
    pub add_sheet: Option<SheetCreated>,
    pub copy_sheet: Option<SheetCreated>,
    pub delete_sheet: Option<SheetDeleted>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SheetCreated {
    pub properties: SheetSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetSummary {
    pub sheet_id: String,
    pub title: String,
    pub index: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetDeleted {
    pub result: bool,
    pub sheet_id: String,
}

// === Values ===

/// Optional query parameters of [`Client::read_range`]
#[derive(Debug, Clone, Default)]
pub struct ReadRangeOptions {
    /// `ToString`, `FormattedValue`, `Formula` or `UnformattedValue`
    pub value_render_option: Option<String>,
    /// `FormattedString`
    pub date_time_render_option: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeValues {
    pub revision: i64,
    pub spreadsheet_token: String,
    pub value_range: ReadValueRange,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadValueRange {
    pub major_dimension: String,
    pub range: String,
    pub revision: i64,
    pub values: Vec<Vec<Value>>,
}

/// Values to write, row-major
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRange {
    pub range: String,
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, values: Vec<Vec<Value>>) -> Self {
        Self {
            range: range.into(),
            values,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteRangeRequest<'a> {
    value_range: &'a ValueRange,
}

/// Summary of cells touched by a write or style update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeUpdated {
    pub spreadsheet_token: String,
    pub updated_range: String,
    pub updated_rows: i64,
    pub updated_columns: i64,
    pub updated_cells: i64,
    pub revision: i64,
}

// === Styles ===

/// Cell style; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// 0 none, 1 underline, 2 strikethrough, 3 both
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    /// 0 left, 1 center, 2 right
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_align: Option<u8>,
    /// 0 top, 1 middle, 2 bottom
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_align: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fore_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_color: Option<String>,
    /// `FULL_BORDER`, `OUTER_BORDER`, `NO_BORDER`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Clears all styling of the range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub bold: bool,
    pub italic: bool,
    /// Size and line height, e.g. `10pt/1.5`
    pub font_size: String,
    pub clean: bool,
}

#[derive(Debug, Serialize)]
struct AppendStyle<'a> {
    range: &'a str,
    style: &'a Style,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetStyleRequest<'a> {
    append_style: AppendStyle<'a>,
}

/// One style applied to several ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangesStyle {
    pub ranges: Vec<String>,
    pub style: Style,
}

#[derive(Debug, Serialize)]
struct BatchStyleRequest<'a> {
    data: &'a [RangesStyle],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchStyleUpdated {
    pub spreadsheet_token: String,
    pub total_updated_rows: i64,
    pub total_updated_columns: i64,
    pub total_updated_cells: i64,
    pub revision: i64,
    pub responses: Vec<RangeUpdated>,
}

// === Find ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FindCondition {
    pub range: String,
    pub match_case: bool,
    pub match_entire_cell: bool,
    pub search_by_regex: bool,
    pub include_formulas: bool,
}

impl FindCondition {
    /// Case-insensitive substring search over `range`
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct FindRequest<'a> {
    find_condition: &'a FindCondition,
    find: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FoundCells {
    pub find_result: FindResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FindResult {
    pub matched_cells: Vec<String>,
    pub matched_formula_cells: Vec<String>,
    pub rows_count: i64,
}

// === Rows and columns ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MajorDimension {
    #[default]
    Rows,
    Columns,
}

/// A half-open span `[start_index, end_index)` of rows or columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dimension {
    pub sheet_id: String,
    pub major_dimension: MajorDimension,
    pub start_index: i64,
    pub end_index: i64,
}

/// Which neighbour inserted rows or columns copy their style from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InheritStyle {
    Before,
    After,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertDimensionRequest<'a> {
    dimension: &'a Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    inherit_style: Option<InheritStyle>,
}

impl<H: HttpClient> Client<H> {
    /// Creates a spreadsheet, in the root folder unless `folder_token` is set
    pub async fn create_spreadsheet(
        &self,
        title: &str,
        folder_token: Option<&str>,
    ) -> Result<Response<SpreadsheetCreated>> {
        let body = CreateSpreadsheetRequest {
            title,
            folder_token,
        };
        let request = with_json(HttpRequest::post(self.url(SHEETS_V3)), &body)?;
        self.call(request).await
    }

    /// Gets the properties and sheets of a spreadsheet
    pub async fn get_sheet_meta(
        &self,
        spreadsheet_token: &str,
        options: &SheetMetaOptions,
    ) -> Result<Response<SheetMeta>> {
        let url = self.url(&format!(
            "{SHEETS_V2}/{}/metainfo{}",
            segment(spreadsheet_token),
            query(&[
                ("extFields", options.ext_fields.as_deref()),
                ("user_id_type", options.user_id_type.as_deref()),
            ])
        ));
        self.call(HttpRequest::get(url)).await
    }

    /// Adds, copies or deletes sheets in one request
    pub async fn batch_update_sheets(
        &self,
        spreadsheet_token: &str,
        operations: &[SheetOperation],
    ) -> Result<Response<SheetReplies>> {
        let url = self.url(&format!(
            "{SHEETS_V2}/{}/sheets_batch_update",
            segment(spreadsheet_token)
        ));
        let body = BatchUpdateRequest {
            requests: operations,
        };
        self.call(with_json(HttpRequest::post(url), &body)?).await
    }

    /// Reads the values of a single range
    pub async fn read_range(
        &self,
        spreadsheet_token: &str,
        range: &str,
        options: &ReadRangeOptions,
    ) -> Result<Response<RangeValues>> {
        let url = self.url(&format!(
            "{SHEETS_V2}/{}/values/{}{}",
            segment(spreadsheet_token),
            segment(range),
            query(&[
                ("valueRenderOption", options.value_render_option.as_deref()),
                (
                    "dateTimeRenderOption",
                    options.date_time_render_option.as_deref()
                ),
                ("user_id_type", options.user_id_type.as_deref()),
            ])
        ));
        self.call(HttpRequest::get(url)).await
    }

    /// Overwrites a single range
    pub async fn write_range(
        &self,
        spreadsheet_token: &str,
        value_range: &ValueRange,
    ) -> Result<Response<RangeUpdated>> {
        let url = self.url(&format!("{SHEETS_V2}/{}/values", segment(spreadsheet_token)));
        let body = WriteRangeRequest { value_range };
        self.call(with_json(HttpRequest::put(url), &body)?).await
    }

    /// Applies `style` to one range
    pub async fn set_cell_style(
        &self,
        spreadsheet_token: &str,
        range: &str,
        style: &Style,
    ) -> Result<Response<RangeUpdated>> {
        let url = self.url(&format!("{SHEETS_V2}/{}/style", segment(spreadsheet_token)));
        let body = SetStyleRequest {
            append_style: AppendStyle { range, style },
        };
        self.call(with_json(HttpRequest::put(url), &body)?).await
    }

    /// Applies several styles, each to a list of ranges
    pub async fn batch_set_cell_style(
        &self,
        spreadsheet_token: &str,
        data: &[RangesStyle],
    ) -> Result<Response<BatchStyleUpdated>> {
        let url = self.url(&format!(
            "{SHEETS_V2}/{}/styles_batch_update",
            segment(spreadsheet_token)
        ));
        let body = BatchStyleRequest { data };
        self.call(with_json(HttpRequest::put(url), &body)?).await
    }

    /// Finds the cells of `sheet_id` matching `find`
    pub async fn find_cells(
        &self,
        spreadsheet_token: &str,
        sheet_id: &str,
        condition: &FindCondition,
        find: &str,
    ) -> Result<Response<FoundCells>> {
        let url = self.url(&format!(
            "{SHEETS_V3}/{}/sheets/{}/find",
            segment(spreadsheet_token),
            segment(sheet_id)
        ));
        let body = FindRequest {
            find_condition: condition,
            find,
        };
        self.call(with_json(HttpRequest::post(url), &body)?).await
    }

    /// Inserts empty rows or columns
    pub async fn insert_dimension_range(
        &self,
        spreadsheet_token: &str,
        dimension: &Dimension,
        inherit_style: Option<InheritStyle>,
    ) -> Result<Response<NoData>> {
        let url = self.url(&format!(
            "{SHEETS_V2}/{}/insert_dimension_range",
            segment(spreadsheet_token)
        ));
        let body = InsertDimensionRequest {
            dimension,
            inherit_style,
        };
        self.call(with_json(HttpRequest::post(url), &body)?).await
    }
}
