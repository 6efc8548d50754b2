mod capture;
mod format;
