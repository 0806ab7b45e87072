mod report;
mod traffic;
