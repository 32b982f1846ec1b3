quantity!(Kilowatts, "kW");
