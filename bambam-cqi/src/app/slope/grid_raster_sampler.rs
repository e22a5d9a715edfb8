use super::RasterSampler;
use crate::model::network::CqiError;
use geo::Point;
use std::collections::HashMap;
use std::path::Path;

/// an in-memory raster of square cells, row-major from the north edge, as
/// read from an ESRI ASCII grid. coordinates are in the network's metric CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRasterSampler {
    ncols: usize,
    nrows: usize,
    xll: f64,
    yll: f64,
    cellsize: f64,
    nodata: Option<f64>,
    values: Vec<f64>,
}

impl GridRasterSampler {
    pub fn new(
        ncols: usize,
        nrows: usize,
        lower_left: (f64, f64),
        cellsize: f64,
        nodata: Option<f64>,
        values: Vec<f64>,
    ) -> Result<GridRasterSampler, CqiError> {
        if ncols == 0 || nrows == 0 {
            return Err(CqiError::ConfigurationError(String::from(
                "raster must have at least one row and one column",
            )));
        }
        if !(cellsize.is_finite() && cellsize > 0.0) {
            return Err(CqiError::ConfigurationError(format!(
                "raster cellsize must be positive, found {cellsize}"
            )));
        }
        if values.len() != ncols * nrows {
            return Err(CqiError::ConfigurationError(format!(
                "raster of {ncols}x{nrows} cells has {} values",
                values.len()
            )));
        }
        let (xll, yll) = lower_left;
        Ok(GridRasterSampler {
            ncols,
            nrows,
            xll,
            yll,
            cellsize,
            nodata,
            values,
        })
    }

    pub fn from_file(path: &Path) -> Result<GridRasterSampler, CqiError> {
        let path_str = path.to_string_lossy().to_string();
        let text =
            std::fs::read_to_string(path).map_err(|e| CqiError::IoError(path_str.clone(), e))?;
        log::info!("reading slope raster from {path_str}");
        GridRasterSampler::parse_ascii_grid(&text).map_err(|e| {
            CqiError::ConfigurationError(format!("failure reading raster {path_str}: {e}"))
        })
    }

    /// parses the ESRI ASCII grid format: a header of `key value` lines
    /// (ncols, nrows, xllcorner or xllcenter, yllcorner or yllcenter, cellsize,
    /// optional nodata_value) followed by the cell values.
    pub fn parse_ascii_grid(text: &str) -> Result<GridRasterSampler, String> {
        let mut tokens = text.split_whitespace().peekable();
        let mut header: HashMap<String, f64> = HashMap::new();
        while let Some(token) = tokens.peek() {
            if token.parse::<f64>().is_ok() {
                break;
            }
            let key = token.to_lowercase();
            tokens.next();
            let value = tokens
                .next()
                .ok_or_else(|| format!("missing value for header '{key}'"))?
                .parse::<f64>()
                .map_err(|e| format!("invalid value for header '{key}': {e}"))?;
            header.insert(key, value);
        }
        let get = |key: &str| {
            header
                .get(key)
                .copied()
                .ok_or_else(|| format!("missing header '{key}'"))
        };
        let ncols = get("ncols")? as usize;
        let nrows = get("nrows")? as usize;
        let cellsize = get("cellsize")?;
        let xll = match header.get("xllcenter") {
            Some(center) => center - cellsize / 2.0,
            None => get("xllcorner")?,
        };
        let yll = match header.get("yllcenter") {
            Some(center) => center - cellsize / 2.0,
            None => get("yllcorner")?,
        };
        let nodata = header.get("nodata_value").copied();
        let values = tokens
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|e| format!("invalid cell value '{t}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        GridRasterSampler::new(ncols, nrows, (xll, yll), cellsize, nodata, values)
            .map_err(|e| e.to_string())
    }
}

impl RasterSampler for GridRasterSampler {
    fn sample(&self, point: &Point<f64>) -> Option<f64> {
        let col = ((point.x() - self.xll) / self.cellsize).floor();
        let row_from_south = ((point.y() - self.yll) / self.cellsize).floor();
        if !(col >= 0.0 && row_from_south >= 0.0) {
            return None;
        }
        let (col, row_from_south) = (col as usize, row_from_south as usize);
        if col >= self.ncols || row_from_south >= self.nrows {
            return None;
        }
        let row = self.nrows - 1 - row_from_south;
        let value = self.values[row * self.ncols + col];
        match self.nodata {
            Some(nodata) if value == nodata => None,
            _ if value.is_nan() => None,
            _ => Some(value),
        }
    }
}
