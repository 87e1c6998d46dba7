use crate::domain::models::Locale;

// OnePay 国内卡返回码
const DOMESTIC: &[(&str, &str, &str)] = &[
    ("0", "Giao dịch thành công", "Approved"),
    ("1", "Ngân hàng từ chối giao dịch", "Bank Declined"),
    ("3", "Mã đơn vị không tồn tại", "Merchant not exist"),
    ("4", "Không đúng access code", "Invalid access code"),
    ("5", "Số tiền không hợp lệ", "Invalid amount"),
    ("6", "Mã tiền tệ không tồn tại", "Invalid currency code"),
    ("7", "Lỗi không xác định", "Unspecified Failure"),
    ("8", "Số thẻ không đúng", "Invalid card Number"),
    ("9", "Tên chủ thẻ không đúng", "Invalid card name"),
    ("10", "Thẻ hết hạn/Thẻ bị khóa", "Expired Card"),
    ("11", "Thẻ chưa đăng ký sử dụng dịch vụ", "Card Not Registed Service(internet banking)"),
    ("12", "Ngày phát hành/Hết hạn không đúng", "Invalid card date"),
    ("13", "Vượt quá hạn mức thanh toán", "Exist Amount"),
    ("21", "Số tiền không đủ để thanh toán", "Insufficient fund"),
    ("22", "Thông tin tài khoản không đúng", "Invalid Account"),
    ("23", "Tài khoản bị khóa", "Account Locked"),
    ("24", "Thông tin thẻ không đúng", "Invalid Card Info"),
    ("25", "OTP không đúng", "Invalid OTP"),
    ("253", "Quá thời gian thanh toán", "Transaction timeout"),
    ("99", "Người sử dụng hủy giao dịch", "User cancel"),
];

const DOMESTIC_DEFAULT: (&str, &str) = ("Giao dịch thất bại", "Unknown Failure");

// OnePay 国际卡返回码
const INTERNATIONAL: &[(&str, &str)] = &[
    ("0", "Giao dịch thành công - Approved"),
    ("1", "Ngân hàng từ chối giao dịch - Bank Declined"),
    ("3", "Mã đơn vị không tồn tại - Merchant not exist"),
    ("4", "Không đúng access code - Invalid access code"),
    ("5", "Số tiền không hợp lệ - Invalid amount"),
    ("6", "Mã tiền tệ không tồn tại - Invalid currency code"),
    ("7", "Lỗi không xác định - Unspecified Failure"),
    ("8", "Số thẻ không đúng - Invalid card Number"),
    ("9", "Tên chủ thẻ không đúng - Invalid card name"),
    ("10", "Thẻ hết hạn/Thẻ bị khóa - Expired Card"),
    ("11", "Thẻ chưa đăng ký sử dụng dịch vụ - Card Not Registed Service(internet banking)"),
    ("12", "Ngày phát hành/Hết hạn không đúng - Invalid card date"),
    ("13", "Vượt quá hạn mức thanh toán - Exist Amount"),
    ("21", "Số tiền không đủ để thanh toán - Insufficient fund"),
    ("99", "Người sử dụng hủy giao dịch - User cancel"),
];

const INTERNATIONAL_DEFAULT: &str = "Giao dịch thất bại - Failured";

pub fn domestic_message(code: &str, locale: Locale) -> &'static str {
    let (vn, en) = DOMESTIC
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, vn, en)| (*vn, *en))
        .unwrap_or(DOMESTIC_DEFAULT);

    match locale {
        Locale::Vn => vn,
        Locale::En => en,
    }
}

pub fn international_message(code: &str) -> &'static str {
    INTERNATIONAL
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
        .unwrap_or(INTERNATIONAL_DEFAULT)
}
