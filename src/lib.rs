pub mod dcf;
pub mod experiment;
pub mod phy;
pub mod report;
pub mod sim;
pub mod traffic;

#[cfg(test)]
mod test;
