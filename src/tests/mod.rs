mod modem;
mod network;
mod transport;
